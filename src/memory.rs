//! Process-local store used when no `DATABASE_URL` is configured, and in tests.
//! Same contracts as the Postgres repos; contents vanish on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    goals::{GoalRepo, Goals},
    meals::{MealRecord, MealRepo, NewMeal},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    meals: RwLock<Vec<MealRecord>>,
    goals: RwLock<HashMap<Uuid, Goals>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        anyhow::ensure!(
            !users.values().any(|u| u.email == email),
            "duplicate email {email}"
        );
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl MealRepo for MemoryStore {
    async fn insert(&self, user_id: Uuid, meal: NewMeal) -> anyhow::Result<MealRecord> {
        let record = MealRecord {
            id: Uuid::new_v4(),
            user_id,
            food_description: meal.food_description,
            calories: meal.macros.calories,
            protein: meal.macros.protein,
            carbs: meal.macros.carbs,
            fat: meal.macros.fat,
            created_at: OffsetDateTime::now_utc(),
        };
        self.meals.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let meals = self.meals.read().await;
        let mut own: Vec<MealRecord> = meals
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        // insertion order breaks ties between equal timestamps
        own.reverse();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_since(
        &self,
        user_id: Uuid,
        since: OffsetDateTime,
    ) -> anyhow::Result<Vec<MealRecord>> {
        let meals = self.meals.read().await;
        let mut own: Vec<MealRecord> = meals
            .iter()
            .filter(|m| m.user_id == user_id && m.created_at >= since)
            .cloned()
            .collect();
        own.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(own)
    }

    async fn get(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<MealRecord>> {
        let meals = self.meals.read().await;
        Ok(meals
            .iter()
            .find(|m| m.id == meal_id && m.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
        let mut meals = self.meals.write().await;
        let before = meals.len();
        meals.retain(|m| !(m.id == meal_id && m.user_id == user_id));
        Ok(meals.len() < before)
    }
}

#[async_trait]
impl GoalRepo for MemoryStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Goals>> {
        Ok(self.goals.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, user_id: Uuid, goals: &Goals) -> anyhow::Result<Goals> {
        let stored = Goals {
            updated_at: Some(OffsetDateTime::now_utc()),
            ..goals.clone()
        };
        self.goals.write().await.insert(user_id, stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Macros;

    fn new_meal(desc: &str) -> NewMeal {
        NewMeal {
            food_description: desc.into(),
            macros: Macros::new(100.0, 5.0, 10.0, 2.0),
        }
    }

    #[tokio::test]
    async fn meals_are_partitioned_by_user() {
        let store = MemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let first = MealRepo::insert(&store, a, new_meal("first")).await.unwrap();
        MealRepo::insert(&store, a, new_meal("second")).await.unwrap();
        MealRepo::insert(&store, b, new_meal("other")).await.unwrap();

        let listed = store.list_by_user(a, 20, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].food_description, "second");
        assert!(MealRepo::get(&store, b, first.id).await.unwrap().is_none());
        assert!(!store.delete(b, first.id).await.unwrap());
        assert!(store.delete(a, first.id).await.unwrap());
        assert!(!store.delete(a, first.id).await.unwrap());
    }

    #[tokio::test]
    async fn goals_upsert_overwrites() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        assert!(GoalRepo::get(&store, user).await.unwrap().is_none());
        store.upsert(user, &Goals::default()).await.unwrap();
        let saved = store
            .upsert(user, &Goals { calories: 1800, ..Goals::default() })
            .await
            .unwrap();
        assert!(saved.updated_at.is_some());
        assert_eq!(GoalRepo::get(&store, user).await.unwrap().unwrap().calories, 1800);
    }

    #[tokio::test]
    async fn duplicate_email_is_refused() {
        let store = MemoryStore::new();
        store.create("a@b.io", "hash").await.unwrap();
        assert!(store.create("a@b.io", "hash").await.is_err());
    }
}
