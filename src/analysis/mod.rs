mod dto;
mod error;
pub mod gemini;
pub mod handlers;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::AnalysisResult;
pub use error::AnalysisError;
pub use gemini::GeminiAnalyzer;
pub use services::{into_food_entries, FoodAnalyzer};

#[cfg(test)]
pub(crate) use error::ANALYSIS_FAILED_MESSAGE;
#[cfg(test)]
pub(crate) use services::{
    fakes::{ScriptedClient, TWO_ITEMS},
    parse_analysis,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::analyze_routes())
        .merge(handlers::review_routes())
}
