use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument, warn};

use super::dto::{Profile, ProfileResponse};
use crate::state::AppState;

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

pub async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        profile: state.session.profile(),
        rda: state.session.rda(),
    })
}

#[instrument(skip(state))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    if let Err(e) = profile.validate() {
        warn!(error = %e, "invalid profile");
        return Err((StatusCode::BAD_REQUEST, e.to_string()));
    }
    state.session.replace_profile(profile);
    let rda = state.session.rda();
    info!(calories = rda.calories, "profile updated");
    Ok(Json(ProfileResponse {
        profile: state.session.profile(),
        rda,
    }))
}
