use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::Macros;

/// A logged meal. Never updated after insert; removable by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_description: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MealRecord {
    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fat)
    }
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub food_description: String,
    pub macros: Macros,
}
