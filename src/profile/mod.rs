mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub use dto::{Profile, Sex};

#[cfg(test)]
pub(crate) use dto::{ActivityLevel, Goal};

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
