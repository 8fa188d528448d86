use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{
    dto::{GoalInput, MacroCheck, Preset},
    repo_types::Goals,
    services::{find_preset, PRESETS},
};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{ApiJson, ApiPath},
    state::AppState,
};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(get_goals).post(create_goals).put(update_goals))
        .route("/goals/presets", get(list_presets))
        .route("/goals/presets/:slug", post(apply_preset))
        .route("/goals/macro-check", get(macro_check))
}

/// Stored goals, or the defaults when the user has never saved any.
pub async fn load_goals(state: &AppState, user_id: Uuid) -> Result<Goals, AppError> {
    let goals = state.goals.get(user_id).await.map_err(|e| {
        error!(error = %e, %user_id, "failed to load goals");
        AppError::Internal(e)
    })?;
    Ok(goals.unwrap_or_default())
}

async fn save_goals(state: &AppState, user_id: Uuid, goals: &Goals) -> Result<Goals, AppError> {
    let saved = state.goals.upsert(user_id, goals).await.map_err(|e| {
        error!(error = %e, %user_id, "failed to save goals");
        AppError::Internal(e)
    })?;
    info!(%user_id, calories = saved.calories, "goals saved");
    Ok(saved)
}

#[instrument(skip(state))]
pub async fn get_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Goals>, AppError> {
    Ok(Json(load_goals(&state, user_id).await?))
}

#[instrument(skip(state, input))]
pub async fn create_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<GoalInput>,
) -> Result<(StatusCode, Json<Goals>), AppError> {
    let goals = input.validate()?;
    let saved = save_goals(&state, user_id, &goals).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[instrument(skip(state, input))]
pub async fn update_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(input): ApiJson<GoalInput>,
) -> Result<Json<Goals>, AppError> {
    let goals = input.validate()?;
    Ok(Json(save_goals(&state, user_id, &goals).await?))
}

pub async fn list_presets() -> Json<&'static [Preset]> {
    Json(PRESETS.as_slice())
}

#[instrument(skip(state))]
pub async fn apply_preset(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<Goals>, AppError> {
    let preset = find_preset(&slug).ok_or_else(|| AppError::NotFound("Unknown preset".into()))?;
    let mut goals = load_goals(&state, user_id).await?;
    goals.apply_preset(preset);
    Ok(Json(save_goals(&state, user_id, &goals).await?))
}

#[instrument(skip(state))]
pub async fn macro_check(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MacroCheck>, AppError> {
    Ok(Json(load_goals(&state, user_id).await?.macro_check()))
}
