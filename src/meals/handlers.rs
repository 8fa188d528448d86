use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateMealRequest, HistoryQuery, MealHistory},
    repo_types::MealRecord,
    services::{create_meal, delete_meal, split_history},
};
use crate::{
    auth::AuthUser,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    local_time::now_at_offset,
    state::AppState,
};

const MAX_PAGE: i64 = 100;

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create))
        .route("/meals/:id", get(get_meal).delete(remove))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealRecord>), AppError> {
    let text = body.text.unwrap_or_default();
    let meal = create_meal(&state, user_id, &text).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/meals/{}", meal.id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(meal)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(q): ApiQuery<HistoryQuery>,
) -> Result<Json<MealHistory>, AppError> {
    let now = now_at_offset(q.tz_offset_minutes)?;
    let meals = state
        .meals
        .list_by_user(user_id, q.limit.clamp(1, MAX_PAGE), q.offset.max(0))
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "failed to load meals");
            AppError::Internal(e)
        })?;
    Ok(Json(split_history(meals, now)))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MealRecord>, AppError> {
    state
        .meals
        .get(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Meal not found".into()))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> StatusCode {
    delete_meal(&state, user_id, id).await;
    StatusCode::NO_CONTENT
}
