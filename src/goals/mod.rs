pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{GoalRepo, PgGoalRepo};
pub use repo_types::Goals;

pub fn router() -> Router<AppState> {
    handlers::goal_routes()
}
