use time::OffsetDateTime;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    dto::MealHistory,
    repo_types::{MealRecord, NewMeal},
};
use crate::{error::AppError, state::AppState};

/// Parses the description and stores the estimate for `user_id`.
pub async fn create_meal(
    state: &AppState,
    user_id: Uuid,
    text: &str,
) -> Result<MealRecord, AppError> {
    let macros = state.parser.parse(text).await?;
    let meal = state
        .meals
        .insert(
            user_id,
            NewMeal {
                food_description: text.trim().to_string(),
                macros,
            },
        )
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "failed to save meal");
            AppError::Internal(e)
        })?;
    info!(%user_id, meal_id = %meal.id, calories = meal.calories, "meal logged");
    Ok(meal)
}

/// Deleting a missing meal, or failing to delete, never reaches the caller.
pub async fn delete_meal(state: &AppState, user_id: Uuid, meal_id: Uuid) {
    match state.meals.delete(user_id, meal_id).await {
        Ok(true) => info!(%user_id, %meal_id, "meal deleted"),
        Ok(false) => warn!(%user_id, %meal_id, "meal to delete not found"),
        Err(e) => error!(error = %e, %user_id, %meal_id, "failed to delete meal"),
    }
}

pub fn split_history(meals: Vec<MealRecord>, now: OffsetDateTime) -> MealHistory {
    let (today, previous) = meals
        .into_iter()
        .partition(|m| m.created_at.to_offset(now.offset()).date() == now.date());
    MealHistory { today, previous }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Macros;
    use time::macros::datetime;

    fn meal_at(at: OffsetDateTime) -> MealRecord {
        MealRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            food_description: "toast".into(),
            calories: 80.0,
            protein: 3.0,
            carbs: 15.0,
            fat: 1.0,
            created_at: at,
        }
    }

    #[test]
    fn history_splits_at_local_midnight() {
        let now = datetime!(2024-05-15 09:00 -05:00);
        let meals = vec![
            meal_at(datetime!(2024-05-15 13:00 UTC)), // 08:00 local
            meal_at(datetime!(2024-05-15 03:00 UTC)), // 22:00 local, previous day
            meal_at(datetime!(2024-05-10 12:00 UTC)),
        ];
        let history = split_history(meals, now);
        assert_eq!(history.today.len(), 1);
        assert_eq!(history.previous.len(), 2);
    }

    #[tokio::test]
    async fn create_then_delete_twice() {
        let state = AppState::in_memory();
        let user = Uuid::new_v4();
        let meal = create_meal(&state, user, "  2 eggs ").await.unwrap();
        assert_eq!(meal.food_description, "2 eggs");
        assert_eq!(meal.macros(), Macros::new(140.0, 12.0, 0.0, 10.0));

        delete_meal(&state, user, meal.id).await;
        delete_meal(&state, user, meal.id).await;
        assert!(state.meals.get(user, meal.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn other_users_cannot_delete() {
        let state = AppState::in_memory();
        let owner = Uuid::new_v4();
        let meal = create_meal(&state, owner, "rice").await.unwrap();
        delete_meal(&state, Uuid::new_v4(), meal.id).await;
        assert!(state.meals.get(owner, meal.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_saving() {
        let state = AppState::in_memory();
        let user = Uuid::new_v4();
        let err = create_meal(&state, user, "").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(state.meals.list_by_user(user, 20, 0).await.unwrap().is_empty());
    }
}
