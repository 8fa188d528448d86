use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use super::Macros;
use crate::{error::AppError, extract::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ParseMealRequest {
    #[serde(default)]
    pub text: Option<String>,
}

pub fn parse_routes() -> Router<AppState> {
    Router::new().route("/parse-meal", post(parse_meal))
}

#[instrument(skip(state, body))]
pub async fn parse_meal(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ParseMealRequest>,
) -> Result<Json<Macros>, AppError> {
    let text = body.text.unwrap_or_default();
    let macros = state.parser.parse(&text).await?;
    info!(calories = macros.calories, llm = state.parser.uses_llm(), "meal parsed");
    Ok(Json(macros))
}
