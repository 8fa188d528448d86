use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, instrument};

use super::stats::{summarize, DashboardSummary};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::ApiQuery,
    goals::handlers::load_goals,
    local_time::{now_at_offset, start_of_week},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(q): ApiQuery<DashboardQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let now = now_at_offset(q.tz_offset_minutes)?;
    let (meals, goals) = tokio::join!(
        state.meals.list_since(user_id, start_of_week(now)),
        load_goals(&state, user_id),
    );
    let meals = meals.map_err(|e| {
        error!(error = %e, %user_id, "failed to load meals for dashboard");
        AppError::Internal(e)
    })?;
    Ok(Json(summarize(&meals, &goals?, now)))
}
