use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, UtcOffset};

use crate::camera::DEFAULT_JPEG_QUALITY;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub camera_snapshot_path: Option<PathBuf>,
    pub jpeg_quality: u8,
    pub local_offset: UtcOffset,
    pub seed_demo_logs: bool,
}

/// Parses `+HH:MM` / `-HH:MM`.
pub fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid UTC offset {raw:?}, expected e.g. +02:00"))
}

impl AppConfig {
    /// Reads the environment. Call before any runtime threads start so the
    /// system UTC offset can still be queried.
    pub fn from_env() -> anyhow::Result<Self> {
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.into()),
            timeout_secs: std::env::var("ANALYSIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };

        let local_offset = match std::env::var("LOCAL_UTC_OFFSET") {
            Ok(raw) => parse_offset(&raw)?,
            Err(_) => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        };

        Ok(Self {
            gemini,
            camera_snapshot_path: std::env::var("CAMERA_SNAPSHOT_PATH").ok().map(PathBuf::from),
            jpeg_quality: std::env::var("JPEG_QUALITY")
                .ok()
                .and_then(|v| v.parse::<u8>().ok())
                .filter(|q| (1..=100).contains(q))
                .unwrap_or(DEFAULT_JPEG_QUALITY),
            local_offset,
            seed_demo_logs: std::env::var("SEED_DEMO_LOGS")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        })
    }
}
