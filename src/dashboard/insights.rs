use serde::{Deserialize, Serialize};
use time::UtcOffset;

use super::stats::MacroTotals;
use crate::{
    goals::Goals,
    meals::MealRecord,
    nutrition::{CARBS_KCAL, FAT_KCAL, PROTEIN_KCAL},
};

const HIGH_CALORIE_RATIO: f64 = 1.10;
const LOW_CALORIE_RATIO: f64 = 0.80;
const LATE_NIGHT_HOUR: u8 = 21;
const LATE_NIGHT_SHARE: f64 = 0.30;
const MIN_PROTEIN_SHARE: f64 = 0.15;

const CALORIE_DENSE: &[(&str, &str)] = &[
    ("fried", "Fried foods showed up this week. Baking, grilling or air-frying cuts a lot of fat."),
    ("pizza", "Pizza is calorie-dense. A thin crust and a side salad make it lighter."),
    ("burger", "Burgers add up quickly. Try a lean patty or skip the extra cheese."),
    ("fries", "Swap fries for a side of vegetables or a baked potato."),
    ("soda", "Sugary drinks are empty calories. Sparkling water is an easy swap."),
    ("chips", "Chips are easy to overeat. Portion them out or try nuts instead."),
    ("cake", "Desserts like cake are best kept to small portions."),
    ("donut", "Donuts are high in sugar and fat. Yogurt with fruit is a lighter treat."),
    ("ice cream", "Ice cream is calorie-dense. Frozen yogurt or fruit sorbet is lighter."),
    ("candy", "Candy adds sugar without much else. Fresh fruit satisfies the same craving."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Tip,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Fixed threshold rules, evaluated in order over the week's meals.
pub fn generate_insights(
    meals: &[&MealRecord],
    average: &MacroTotals,
    goals: &Goals,
    offset: UtcOffset,
) -> Vec<Insight> {
    let mut out = Vec::new();
    if meals.is_empty() {
        return out;
    }

    let goal = goals.calories as f64;
    if average.calories > goal * HIGH_CALORIE_RATIO {
        out.push(Insight::new(
            InsightKind::Warning,
            "High calorie intake",
            format!(
                "You're averaging {:.0} kcal a day, above your {} kcal goal.",
                average.calories, goals.calories
            ),
        ));
    } else if average.calories < goal * LOW_CALORIE_RATIO {
        out.push(Insight::new(
            InsightKind::Tip,
            "Low calorie intake",
            format!(
                "You're averaging {:.0} kcal a day, well below your {} kcal goal. Make sure every meal gets logged.",
                average.calories, goals.calories
            ),
        ));
    }

    let late = meals
        .iter()
        .filter(|m| m.created_at.to_offset(offset).hour() >= LATE_NIGHT_HOUR)
        .count();
    if late as f64 / meals.len() as f64 > LATE_NIGHT_SHARE {
        out.push(Insight::new(
            InsightKind::Warning,
            "Late-night eating",
            format!("{late} of {} meals this week were after 9 PM.", meals.len()),
        ));
    }

    let protein_kcal: f64 = meals.iter().map(|m| m.protein * PROTEIN_KCAL).sum();
    let macro_kcal: f64 = meals
        .iter()
        .map(|m| m.protein * PROTEIN_KCAL + m.carbs * CARBS_KCAL + m.fat * FAT_KCAL)
        .sum();
    if macro_kcal > 0.0 && protein_kcal / macro_kcal < MIN_PROTEIN_SHARE {
        out.push(Insight::new(
            InsightKind::Tip,
            "Low protein",
            format!(
                "Protein is only {:.0}% of your calories. Eggs, fish, legumes or yogurt help close the gap.",
                protein_kcal / macro_kcal * 100.0
            ),
        ));
    }

    let descriptions: Vec<String> = meals
        .iter()
        .map(|m| m.food_description.to_lowercase())
        .collect();
    for (term, suggestion) in CALORIE_DENSE {
        if descriptions.iter().any(|d| d.contains(term)) {
            out.push(Insight::new(InsightKind::Tip, "Suggestion", *suggestion));
        }
    }

    if out.is_empty() {
        out.push(Insight::new(
            InsightKind::Positive,
            "On track",
            "Your intake this week is in line with your goals.",
        ));
    }

    out
}
