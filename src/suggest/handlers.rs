use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};

use super::dto::{ApplySuggestionRequest, ApplySuggestionResponse, SuggestQuery, SuggestResponse};
use super::services::{apply_suggestion, suggest};
use crate::state::AppState;

pub fn suggest_routes() -> Router<AppState> {
    Router::new()
        .route("/suggestions", get(get_suggestions))
        .route("/suggestions/apply", post(post_apply))
}

pub async fn get_suggestions(Query(q): Query<SuggestQuery>) -> Json<SuggestResponse> {
    Json(SuggestResponse {
        suggestions: suggest(&q.q),
    })
}

pub async fn post_apply(Json(body): Json<ApplySuggestionRequest>) -> Json<ApplySuggestionResponse> {
    Json(ApplySuggestionResponse {
        text: apply_suggestion(&body.text, &body.choice),
        suggestions: Vec::new(),
    })
}
