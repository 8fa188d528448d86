use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Weekday};

use super::insights::{generate_insights, Insight};
use crate::{
    goals::Goals,
    local_time::start_of_week,
    meals::MealRecord,
    nutrition::Macros,
};

const MORNING_ENDS: u8 = 12;
const AFTERNOON_ENDS: u8 = 17;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    fn add(&mut self, m: Macros) {
        self.calories += m.calories;
        self.protein += m.protein;
        self.carbs += m.carbs;
        self.fat += m.fat;
    }

    fn divided_by(self, n: f64) -> Self {
        Self {
            calories: self.calories / n,
            protein: self.protein / n,
            carbs: self.carbs / n,
            fat: self.fat / n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: String,
    pub label: String,
    pub calories: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealTiming {
    pub morning: u32,
    pub afternoon: u32,
    pub evening: u32,
}

/// Today's intake as whole percentages of the goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub calories_pct: u32,
    pub protein_pct: u32,
    pub carbs_pct: u32,
    pub fat_pct: u32,
    pub calories_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: MacroTotals,
    pub week: Vec<DayTotal>,
    pub weekly_average: MacroTotals,
    pub meal_timing: MealTiming,
    pub goals: Goals,
    pub progress: GoalProgress,
    pub insights: Vec<Insight>,
}

pub(crate) enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

pub(crate) fn time_of_day(hour: u8) -> TimeOfDay {
    if hour < MORNING_ENDS {
        TimeOfDay::Morning
    } else if hour < AFTERNOON_ENDS {
        TimeOfDay::Afternoon
    } else {
        TimeOfDay::Evening
    }
}

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Sunday => "Sun",
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
    }
}

fn pct(value: f64, goal: i32) -> u32 {
    if goal <= 0 {
        return 0;
    }
    (value / goal as f64 * 100.0).round().max(0.0) as u32
}

/// Aggregates `meals` (any order, any age) into today's and this week's view.
/// `now` carries the caller's UTC offset; all day boundaries are local to it.
pub fn summarize(meals: &[MealRecord], goals: &Goals, now: OffsetDateTime) -> DashboardSummary {
    let offset = now.offset();
    let week_start = start_of_week(now);
    let today_date = now.date();

    let week_meals: Vec<&MealRecord> = meals
        .iter()
        .filter(|m| {
            m.created_at >= week_start && m.created_at.to_offset(offset).date() <= today_date
        })
        .collect();

    let mut today = MacroTotals::default();
    let mut week_totals = MacroTotals::default();
    let mut timing = MealTiming::default();
    let mut week: Vec<DayTotal> = (0..7)
        .map(|i| {
            let date = (week_start + Duration::days(i)).date();
            DayTotal {
                date: format!("{:04}-{:02}-{:02}", date.year(), date.month() as u8, date.day()),
                label: weekday_label(date.weekday()).to_string(),
                calories: 0.0,
            }
        })
        .collect();

    for meal in &week_meals {
        let local = meal.created_at.to_offset(offset);
        let macros = meal.macros();
        week_totals.add(macros);
        if local.date() == today_date {
            today.add(macros);
        }
        let day_index = local.weekday().number_days_from_sunday() as usize;
        week[day_index].calories += meal.calories;
        match time_of_day(local.hour()) {
            TimeOfDay::Morning => timing.morning += 1,
            TimeOfDay::Afternoon => timing.afternoon += 1,
            TimeOfDay::Evening => timing.evening += 1,
        }
    }

    let elapsed_days = (today_date.weekday().number_days_from_sunday() + 1) as f64;
    let weekly_average = week_totals.divided_by(elapsed_days);

    let progress = GoalProgress {
        calories_pct: pct(today.calories, goals.calories),
        protein_pct: pct(today.protein, goals.protein),
        carbs_pct: pct(today.carbs, goals.carbs),
        fat_pct: pct(today.fat, goals.fat),
        calories_remaining: goals.calories as f64 - today.calories,
    };

    let insights = generate_insights(&week_meals, &weekly_average, goals, offset);

    DashboardSummary {
        today,
        week,
        weekly_average,
        meal_timing: timing,
        goals: goals.clone(),
        progress,
        insights,
    }
}
