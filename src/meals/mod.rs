pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{MealRepo, PgMealRepo};
pub use repo_types::{MealRecord, NewMeal};

pub fn router() -> Router<AppState> {
    handlers::meal_routes()
}
