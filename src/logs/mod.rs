mod dto;
pub mod handlers;
mod repo;
mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo::{seed_entries, FoodLog};
pub use repo_types::{FoodEntry, Nutrient};

#[cfg(test)]
pub(crate) use repo_types::NutrientCategory;

pub fn router() -> Router<AppState> {
    handlers::log_routes()
}
