use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Daily nutrition targets for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Goals {
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
    pub fiber: i32,
    pub sodium: i32,
    pub sugar: i32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

pub const DEFAULT_FIBER: i32 = 25;
pub const DEFAULT_SODIUM: i32 = 2300;
pub const DEFAULT_SUGAR: i32 = 50;

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: 2000,
            protein: 150,
            carbs: 250,
            fat: 65,
            fiber: DEFAULT_FIBER,
            sodium: DEFAULT_SODIUM,
            sugar: DEFAULT_SUGAR,
            updated_at: None,
        }
    }
}
