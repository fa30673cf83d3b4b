use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{ProgressResponse, RdaResponse};
use super::progress::build_progress;
use super::rda::{calculate_rda, energy_breakdown};
use crate::state::AppState;

pub fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route("/rda", get(get_rda))
        .route("/progress", get(get_progress))
}

pub async fn get_rda(State(state): State<AppState>) -> Json<RdaResponse> {
    let profile = state.session.profile();
    Json(RdaResponse {
        targets: calculate_rda(&profile),
        energy: energy_breakdown(&profile),
    })
}

#[instrument(skip(state))]
pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    let now = state.session.now();
    let totals = state.session.today();
    let rda = state.session.rda();
    Json(ProgressResponse {
        date: now.date().to_string(),
        progress: build_progress(&totals, &rda),
        totals,
    })
}
