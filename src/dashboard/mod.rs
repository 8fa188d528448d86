//! Read-only aggregation of a user's recent meals against their goals.

pub mod handlers;
pub mod insights;
pub mod stats;

use crate::state::AppState;
use axum::Router;

pub use insights::{Insight, InsightKind};
pub use stats::{summarize, DashboardSummary};

pub fn router() -> Router<AppState> {
    handlers::dashboard_routes()
}
