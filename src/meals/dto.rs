use serde::{Deserialize, Serialize};

use super::repo_types::MealRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMealRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Caller's UTC offset, used to decide what "today" means.
    #[serde(default)]
    pub tz_offset_minutes: i32,
}
fn default_limit() -> i64 {
    20
}

/// Recent meals split at the caller's local midnight.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MealHistory {
    pub today: Vec<MealRecord>,
    pub previous: Vec<MealRecord>,
}
