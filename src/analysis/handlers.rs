use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{
    AnalysisResult, AnalyzeBase64Request, AnalyzeTextRequest, ConfirmResponse, DismissResponse,
};
use super::error::AnalysisError;
use super::services::{submit_analysis, submit_with_slot, AnalysisInput};
use crate::camera::{capture_once, CapturedImage};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis", post(analyze_text))
        .route("/analysis/image", post(analyze_upload))
        .route("/analysis/base64", post(analyze_base64))
        .route("/analysis/capture", post(analyze_capture))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/pending", get(get_pending).delete(dismiss_pending))
        .route("/analysis/confirm", post(confirm_pending))
}

fn reject(e: impl Into<AnalysisError>) -> (StatusCode, String) {
    let e: AnalysisError = e.into();
    e.into()
}

async fn run(state: &AppState, input: AnalysisInput) -> ApiResult<AnalysisResult> {
    submit_analysis(state, input)
        .await
        .map(Json)
        .map_err(Into::into)
}

#[instrument(skip(state, body))]
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeTextRequest>,
) -> ApiResult<AnalysisResult> {
    run(&state, AnalysisInput::text(body.text)).await
}

/// POST /analysis/image (multipart)
/// Fields: `image` (JPEG), optional `text`.
#[instrument(skip(state, mp))]
pub async fn analyze_upload(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> ApiResult<AnalysisResult> {
    let mut input = AnalysisInput::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") | Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                let image = CapturedImage::from_jpeg(data).map_err(reject)?;
                input.image = Some(image);
            }
            Some("text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                input.text = Some(text);
            }
            _ => {}
        }
    }
    if input.image.is_none() {
        return Err((StatusCode::BAD_REQUEST, "image field is required".into()));
    }
    run(&state, input).await
}

/// POST /analysis/base64 { image_b64: "...", text?: "..." }
#[instrument(skip(state, body))]
pub async fn analyze_base64(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBase64Request>,
) -> ApiResult<AnalysisResult> {
    let image = CapturedImage::from_base64(&body.image_b64).map_err(|e| {
        warn!(error = %e, "rejected image payload");
        reject(e)
    })?;
    run(
        &state,
        AnalysisInput {
            text: body.text,
            image: Some(image),
        },
    )
    .await
}

#[instrument(skip(state))]
pub async fn analyze_capture(State(state): State<AppState>) -> ApiResult<AnalysisResult> {
    // the camera stays closed while another analysis is outstanding
    let in_flight = state.session.begin_analysis().map_err(reject)?;
    let image = capture_once(&*state.camera, state.config.jpeg_quality)
        .await
        .map_err(reject)?;
    info!(bytes = image.len(), "captured still");
    submit_with_slot(&state, AnalysisInput::image(image), in_flight)
        .await
        .map(Json)
        .map_err(Into::into)
}

pub async fn get_pending(State(state): State<AppState>) -> ApiResult<AnalysisResult> {
    state
        .session
        .pending()
        .map(Json)
        .ok_or_else(|| reject(AnalysisError::NothingPending))
}

#[instrument(skip(state))]
pub async fn confirm_pending(State(state): State<AppState>) -> ApiResult<ConfirmResponse> {
    let added = state.session.confirm_pending().map_err(|e| {
        warn!(error = %e, "confirm without pending result");
        reject(e)
    })?;
    Ok(Json(ConfirmResponse {
        log_len: state.session.log().len(),
        added,
    }))
}

pub async fn dismiss_pending(State(state): State<AppState>) -> Json<DismissResponse> {
    Json(DismissResponse {
        dismissed: state.session.dismiss_pending(),
    })
}
