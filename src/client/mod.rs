//! Client side of the API: session holding and typed calls.

mod api;
mod session;

pub use api::{ClientError, NutritionClient};
pub use session::{Session, SessionStore};
