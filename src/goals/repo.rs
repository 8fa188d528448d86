use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Goals;

/// One goals row per user.
#[async_trait]
pub trait GoalRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Goals>>;
    /// Insert or overwrite; `updated_at` is set by the store.
    async fn upsert(&self, user_id: Uuid, goals: &Goals) -> anyhow::Result<Goals>;
}

pub struct PgGoalRepo {
    db: PgPool,
}

impl PgGoalRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GoalRepo for PgGoalRepo {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Goals>> {
        let row = sqlx::query_as::<_, Goals>(
            r#"
            SELECT calories, protein, carbs, fat, fiber, sodium, sugar, updated_at
            FROM user_goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get goals")?;
        Ok(row)
    }

    async fn upsert(&self, user_id: Uuid, goals: &Goals) -> anyhow::Result<Goals> {
        let row = sqlx::query_as::<_, Goals>(
            r#"
            INSERT INTO user_goals (user_id, calories, protein, carbs, fat, fiber, sodium, sugar, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            ON CONFLICT (user_id) DO UPDATE SET
                calories = EXCLUDED.calories,
                protein = EXCLUDED.protein,
                carbs = EXCLUDED.carbs,
                fat = EXCLUDED.fat,
                fiber = EXCLUDED.fiber,
                sodium = EXCLUDED.sodium,
                sugar = EXCLUDED.sugar,
                updated_at = EXCLUDED.updated_at
            RETURNING calories, protein, carbs, fat, fiber, sodium, sugar, updated_at
            "#,
        )
        .bind(user_id)
        .bind(goals.calories)
        .bind(goals.protein)
        .bind(goals.carbs)
        .bind(goals.fat)
        .bind(goals.fiber)
        .bind(goals.sodium)
        .bind(goals.sugar)
        .fetch_one(&self.db)
        .await
        .context("upsert goals")?;
        Ok(row)
    }
}
