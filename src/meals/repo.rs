use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{MealRecord, NewMeal};

/// Meal table access. Every call is scoped to `user_id`.
#[async_trait]
pub trait MealRepo: Send + Sync {
    async fn insert(&self, user_id: Uuid, meal: NewMeal) -> anyhow::Result<MealRecord>;
    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealRecord>>;
    /// Oldest first, `created_at >= since`.
    async fn list_since(
        &self,
        user_id: Uuid,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<MealRecord>>;
    async fn get(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<MealRecord>>;
    /// Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgMealRepo {
    db: PgPool,
}

impl PgMealRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealRepo for PgMealRepo {
    async fn insert(&self, user_id: Uuid, meal: NewMeal) -> anyhow::Result<MealRecord> {
        let row = sqlx::query_as::<_, MealRecord>(
            r#"
            INSERT INTO meals (id, user_id, food_description, calories, protein, carbs, fat)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, food_description, calories, protein, carbs, fat, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&meal.food_description)
        .bind(meal.macros.calories)
        .bind(meal.macros.protein)
        .bind(meal.macros.carbs)
        .bind(meal.macros.fat)
        .fetch_one(&self.db)
        .await
        .context("insert meal")?;
        Ok(row)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, food_description, calories, protein, carbs, fat, created_at
            FROM meals
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list meals by user")?;
        Ok(rows)
    }

    async fn list_since(
        &self,
        user_id: Uuid,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, food_description, calories, protein, carbs, fat, created_at
            FROM meals
            WHERE user_id = $1 AND created_at >= $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.db)
        .await
        .context("list meals since")?;
        Ok(rows)
    }

    async fn get(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<MealRecord>> {
        let row = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT id, user_id, food_description, calories, protein, carbs, fat, created_at
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(meal_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get meal")?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM meals WHERE id = $1 AND user_id = $2"#)
            .bind(meal_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete meal")?;
        Ok(result.rows_affected() > 0)
    }
}
