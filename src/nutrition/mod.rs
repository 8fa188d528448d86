//! Free-text meal → calorie/macro estimation.

mod fallback;
pub mod handlers;
mod llm;
mod parser;

use serde::{Deserialize, Serialize};

pub use fallback::estimate_from_keywords;
pub use llm::{build_prompt, LlmClient, OpenRouterClient};
pub use parser::MealParser;

/// kcal per gram of protein, carbohydrate and fat.
pub const PROTEIN_KCAL: f64 = 4.0;
pub const CARBS_KCAL: f64 = 4.0;
pub const FAT_KCAL: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Calories implied by the macro quantities alone.
    pub fn macro_calories(&self) -> f64 {
        self.protein * PROTEIN_KCAL + self.carbs * CARBS_KCAL + self.fat * FAT_KCAL
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("invalid response format: {0}")]
    InvalidResponseFormat(String),
}
