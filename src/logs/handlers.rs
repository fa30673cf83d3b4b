use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use super::dto::LogListItem;
use crate::state::AppState;

pub fn log_routes() -> Router<AppState> {
    Router::new().route("/logs", get(list_logs))
}

/// Full history, newest first.
pub async fn list_logs(State(state): State<AppState>) -> Json<Vec<LogListItem>> {
    let log = state.session.log();
    if log.is_empty() {
        debug!("food log is empty");
    }
    let items = log
        .history()
        .into_iter()
        .map(LogListItem::from)
        .collect();
    Json(items)
}
