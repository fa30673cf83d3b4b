use axum::http::StatusCode;
use thiserror::Error;

use crate::camera::CameraError;

/// Shown to the user for any failed analysis attempt.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze food. Please try again.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("nothing to analyze: provide a food description or an image")]
    EmptyInput,
    #[error("an analysis is already in progress")]
    Busy,
    #[error("analysis service error: {0}")]
    Failed(String),
    #[error("malformed analysis response: {0}")]
    Malformed(String),
    #[error("no analysis result is pending")]
    NothingPending,
    #[error(transparent)]
    Camera(#[from] CameraError),
}

impl AnalysisError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::EmptyInput => StatusCode::BAD_REQUEST,
            AnalysisError::Busy => StatusCode::CONFLICT,
            AnalysisError::Failed(_) | AnalysisError::Malformed(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::NothingPending => StatusCode::NOT_FOUND,
            AnalysisError::Camera(CameraError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Camera(CameraError::Capture(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::Camera(CameraError::NotJpeg | CameraError::InvalidBase64) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Service failures collapse into one user-facing message.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Failed(_) | AnalysisError::Malformed(_) => {
                ANALYSIS_FAILED_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<AnalysisError> for (StatusCode, String) {
    fn from(e: AnalysisError) -> Self {
        (e.status(), e.user_message())
    }
}
