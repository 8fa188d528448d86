use serde::{Deserialize, Serialize};

/// Body of `POST`/`PUT /goals`. The four primary fields are required.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GoalInput {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub sugar: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub slug: &'static str,
    pub name: &'static str,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

/// Energy contributed by each macro target versus the declared calorie goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroCheck {
    pub protein_calories: i32,
    pub carbs_calories: i32,
    pub fat_calories: i32,
    pub total: i32,
    pub difference: i32,
    pub mismatch: bool,
}
