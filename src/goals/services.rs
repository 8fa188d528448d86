use std::ops::RangeInclusive;

use super::{
    dto::{GoalInput, MacroCheck, Preset},
    repo_types::{Goals, DEFAULT_FIBER, DEFAULT_SODIUM, DEFAULT_SUGAR},
};
use crate::error::AppError;

/// Declared calories may differ from the macro-derived total by this much before flagging.
pub const MACRO_MISMATCH_KCAL: i32 = 50;

pub static PRESETS: [Preset; 4] = [
    Preset {
        slug: "weight-loss",
        name: "Weight Loss",
        calories: 1500,
        protein: 120,
        carbs: 150,
        fat: 50,
    },
    Preset {
        slug: "maintenance",
        name: "Maintenance",
        calories: 2000,
        protein: 150,
        carbs: 250,
        fat: 65,
    },
    Preset {
        slug: "muscle-gain",
        name: "Muscle Gain",
        calories: 2500,
        protein: 180,
        carbs: 300,
        fat: 80,
    },
    Preset {
        slug: "athlete",
        name: "Athlete",
        calories: 3000,
        protein: 200,
        carbs: 400,
        fat: 100,
    },
];

struct Bound {
    field: &'static str,
    range: RangeInclusive<f64>,
    message: &'static str,
}

const CALORIES: Bound = Bound {
    field: "calories",
    range: 1000.0..=5000.0,
    message: "Calories must be between 1000 and 5000",
};
const PROTEIN: Bound = Bound {
    field: "protein",
    range: 20.0..=300.0,
    message: "Protein must be between 20 and 300g",
};
const CARBS: Bound = Bound {
    field: "carbs",
    range: 50.0..=600.0,
    message: "Carbs must be between 50 and 600g",
};
const FAT: Bound = Bound {
    field: "fat",
    range: 20.0..=150.0,
    message: "Fat must be between 20 and 150g",
};
const FIBER: Bound = Bound {
    field: "fiber",
    range: 10.0..=100.0,
    message: "Fiber must be between 10 and 100g",
};
const SODIUM: Bound = Bound {
    field: "sodium",
    range: 500.0..=5000.0,
    message: "Sodium must be between 500 and 5000mg",
};
const SUGAR: Bound = Bound {
    field: "sugar",
    range: 0.0..=200.0,
    message: "Sugar must be between 0 and 200g",
};

fn check(bound: &Bound, value: f64) -> Result<i32, AppError> {
    if !value.is_finite() || !bound.range.contains(&value) {
        tracing::debug!(field = bound.field, value, "goal out of range");
        return Err(AppError::InvalidInput(bound.message.into()));
    }
    Ok(value.trunc() as i32)
}

fn check_optional(bound: &Bound, value: Option<f64>, default: i32) -> Result<i32, AppError> {
    value.map_or(Ok(default), |v| check(bound, v))
}

/// Absent and zero count alike as not provided.
fn provided(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

impl GoalInput {
    pub fn validate(&self) -> Result<Goals, AppError> {
        let (Some(calories), Some(protein), Some(carbs), Some(fat)) = (
            provided(self.calories),
            provided(self.protein),
            provided(self.carbs),
            provided(self.fat),
        ) else {
            return Err(AppError::InvalidInput("Missing required fields".into()));
        };
        Ok(Goals {
            calories: check(&CALORIES, calories)?,
            protein: check(&PROTEIN, protein)?,
            carbs: check(&CARBS, carbs)?,
            fat: check(&FAT, fat)?,
            fiber: check_optional(&FIBER, self.fiber, DEFAULT_FIBER)?,
            sodium: check_optional(&SODIUM, self.sodium, DEFAULT_SODIUM)?,
            sugar: check_optional(&SUGAR, self.sugar, DEFAULT_SUGAR)?,
            updated_at: None,
        })
    }
}

pub fn find_preset(slug: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.slug == slug)
}

impl Goals {
    /// Overwrites the four primary targets; fiber, sodium and sugar are kept.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.calories = preset.calories;
        self.protein = preset.protein;
        self.carbs = preset.carbs;
        self.fat = preset.fat;
    }

    pub fn macro_check(&self) -> MacroCheck {
        let protein_calories = self.protein * 4;
        let carbs_calories = self.carbs * 4;
        let fat_calories = self.fat * 9;
        let total = protein_calories + carbs_calories + fat_calories;
        let difference = (self.calories - total).abs();
        MacroCheck {
            protein_calories,
            carbs_calories,
            fat_calories,
            total,
            difference,
            mismatch: difference > MACRO_MISMATCH_KCAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(calories: f64) -> GoalInput {
        GoalInput {
            calories: Some(calories),
            protein: Some(150.0),
            carbs: Some(250.0),
            fat: Some(65.0),
            ..Default::default()
        }
    }

    #[test]
    fn calorie_bounds_are_inclusive() {
        assert!(input(999.0).validate().is_err());
        assert_eq!(input(1000.0).validate().unwrap().calories, 1000);
        assert_eq!(input(5000.0).validate().unwrap().calories, 5000);
        assert!(input(5001.0).validate().is_err());
    }

    fn rejection(input: GoalInput) -> String {
        input.validate().unwrap_err().to_string()
    }

    #[test]
    fn missing_primary_field_is_rejected() {
        let no_fat = GoalInput {
            fat: None,
            ..input(2000.0)
        };
        assert_eq!(rejection(no_fat), "Missing required fields");
    }

    #[test]
    fn zero_primary_field_counts_as_missing() {
        assert_eq!(rejection(input(0.0)), "Missing required fields");
        let zero_protein = GoalInput {
            protein: Some(0.0),
            ..input(2000.0)
        };
        assert_eq!(rejection(zero_protein), "Missing required fields");
    }

    #[test]
    fn each_macro_is_range_checked() {
        let protein = GoalInput {
            protein: Some(301.0),
            ..input(2000.0)
        };
        assert_eq!(rejection(protein), "Protein must be between 20 and 300g");
        let carbs = GoalInput {
            carbs: Some(49.0),
            ..input(2000.0)
        };
        assert!(carbs.validate().is_err());
        let fat = GoalInput {
            fat: Some(151.0),
            ..input(2000.0)
        };
        assert!(fat.validate().is_err());
    }

    #[test]
    fn secondary_targets_use_their_own_ranges() {
        let low_fiber = GoalInput {
            fiber: Some(9.0),
            ..input(2000.0)
        };
        assert_eq!(rejection(low_fiber), "Fiber must be between 10 and 100g");
        let high_sodium = GoalInput {
            sodium: Some(5001.0),
            ..input(2000.0)
        };
        assert_eq!(rejection(high_sodium), "Sodium must be between 500 and 5000mg");
        let high_sugar = GoalInput {
            sugar: Some(201.0),
            ..input(2000.0)
        };
        assert_eq!(rejection(high_sugar), "Sugar must be between 0 and 200g");

        let edges = GoalInput {
            fiber: Some(10.0),
            sodium: Some(5000.0),
            sugar: Some(0.0),
            ..input(2000.0)
        }
        .validate()
        .unwrap();
        assert_eq!((edges.fiber, edges.sodium, edges.sugar), (10, 5000, 0));
    }

    #[test]
    fn optional_fields_default_and_values_truncate() {
        let goals = GoalInput {
            sugar: Some(30.9),
            ..input(1800.7)
        }
        .validate()
        .unwrap();
        assert_eq!(goals.calories, 1800);
        assert_eq!(goals.fiber, DEFAULT_FIBER);
        assert_eq!(goals.sodium, DEFAULT_SODIUM);
        assert_eq!(goals.sugar, 30);
    }

    #[test]
    fn preset_overwrites_primary_fields_only() {
        let mut goals = Goals { fiber: 40, ..Goals::default() };
        goals.apply_preset(find_preset("athlete").unwrap());
        assert_eq!((goals.calories, goals.protein, goals.carbs, goals.fat), (3000, 200, 400, 100));
        assert_eq!(goals.fiber, 40);
        assert!(find_preset("keto").is_none());
    }

    #[test]
    fn macro_check_flags_large_gaps() {
        // 150*4 + 250*4 + 65*9 = 2185
        let check = Goals::default().macro_check();
        assert_eq!(check.total, 2185);
        assert_eq!(check.difference, 185);
        assert!(check.mismatch);

        let close = Goals { calories: 2150, ..Goals::default() }.macro_check();
        assert_eq!(close.difference, 35);
        assert!(!close.mismatch);
    }
}
