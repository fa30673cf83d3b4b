pub mod aggregate;
mod dto;
pub mod handlers;
pub mod progress;
pub mod rda;

use crate::state::AppState;
use axum::Router;

pub use aggregate::{aggregate_day, DailyTotals};
pub use rda::{calculate_rda, RdaTarget};

pub fn router() -> Router<AppState> {
    handlers::nutrition_routes()
}
