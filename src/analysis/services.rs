use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::{AnalysisResult, AnalyzedItem};
use super::error::AnalysisError;
use crate::camera::CapturedImage;
use crate::logs::{FoodEntry, Nutrient};
use crate::profile::Profile;
use crate::session::AnalysisGuard;
use crate::state::AppState;

pub const IMAGE_MIME: &str = "image/jpeg";
pub const IMAGE_INSTRUCTION: &str = "Analyze the food shown in this image.";

/// What the user submitted: a description, a photo, or both.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub text: Option<String>,
    pub image: Option<CapturedImage>,
}

impl AnalysisInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(image: CapturedImage) -> Self {
        Self {
            text: None,
            image: Some(image),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    /// Base64 JPEG payload.
    InlineImage { mime_type: &'static str, data: String },
}

/// Provider-neutral request to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub system_instruction: String,
    pub parts: Vec<RequestPart>,
}

/// Seam to the generative-AI backend. Returns the model's raw JSON text.
#[async_trait]
pub trait FoodAnalyzer: Send + Sync {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

pub fn system_instruction(profile: &Profile) -> String {
    format!(
        "You are a world-class nutritionist AI. \
         Analyze the provided food input (text or image). \
         Estimate portions and provide detailed nutrient breakdowns. \
         User Profile: Age {}, Sex {}, Goal {}. \
         Be as accurate as possible with scientific estimates.",
        profile.age, profile.sex, profile.goal
    )
}

pub fn build_request(
    input: &AnalysisInput,
    profile: &Profile,
) -> Result<AnalysisRequest, AnalysisError> {
    let text = input
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if text.is_none() && input.image.is_none() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut parts = Vec::with_capacity(3);
    if let Some(text) = text {
        parts.push(RequestPart::Text(format!("Analyze this food: {text}")));
    }
    if let Some(image) = &input.image {
        parts.push(RequestPart::InlineImage {
            mime_type: IMAGE_MIME,
            data: image.to_base64(),
        });
        parts.push(RequestPart::Text(IMAGE_INSTRUCTION.to_string()));
    }

    Ok(AnalysisRequest {
        system_instruction: system_instruction(profile),
        parts,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn check_amount(what: &str, idx: usize, value: f64) -> Result<(), AnalysisError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::Malformed(format!(
            "item {idx}: {what} must be a non-negative number, got {value}"
        )))
    }
}

fn validate_item(idx: usize, item: &AnalyzedItem) -> Result<(), AnalysisError> {
    if item.name.trim().is_empty() {
        return Err(AnalysisError::Malformed(format!("item {idx}: empty name")));
    }
    check_amount("calories", idx, item.calories)?;
    check_amount("protein", idx, item.macros.protein)?;
    check_amount("fat", idx, item.macros.fat)?;
    check_amount("carbs", idx, item.macros.carbs)?;
    for m in &item.micros {
        check_amount(&m.name, idx, m.amount)?;
    }
    Ok(())
}

/// Parses and validates the model output. Either the whole result is
/// accepted or none of it is.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let result: AnalysisResult = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| AnalysisError::Malformed(e.to_string()))?;
    for (idx, item) in result.items.iter().enumerate() {
        validate_item(idx, item)?;
    }
    Ok(result)
}

/// One entry per analyzed item: the macro triple followed by the micros.
pub fn into_food_entries(result: &AnalysisResult, confirmed_at: OffsetDateTime) -> Vec<FoodEntry> {
    result
        .items
        .iter()
        .map(|item| {
            let mut nutrients = Vec::with_capacity(3 + item.micros.len());
            nutrients.push(Nutrient::macro_g("Protein", item.macros.protein));
            nutrients.push(Nutrient::macro_g("Fat", item.macros.fat));
            nutrients.push(Nutrient::macro_g("Carbs", item.macros.carbs));
            nutrients.extend(
                item.micros
                    .iter()
                    .map(|m| Nutrient::micro(m.name.clone(), m.amount, m.unit.clone())),
            );
            FoodEntry::new(item.name.clone(), item.calories, confirmed_at, nutrients)
        })
        .collect()
}

/// Runs one analysis for the session and parks the result for review.
#[instrument(skip_all, fields(has_text = input.text.is_some(), has_image = input.image.is_some()))]
pub async fn submit_analysis(
    state: &AppState,
    input: AnalysisInput,
) -> Result<AnalysisResult, AnalysisError> {
    // reject empty input before taking the in-flight slot
    let request = build_request(&input, &state.session.profile())?;
    let in_flight = state.session.begin_analysis()?;
    dispatch(state, &request, in_flight).await
}

/// [`submit_analysis`] for a caller that already holds the in-flight slot.
#[instrument(skip_all, fields(has_text = input.text.is_some(), has_image = input.image.is_some()))]
pub async fn submit_with_slot(
    state: &AppState,
    input: AnalysisInput,
    in_flight: AnalysisGuard<'_>,
) -> Result<AnalysisResult, AnalysisError> {
    let request = build_request(&input, &state.session.profile())?;
    dispatch(state, &request, in_flight).await
}

async fn dispatch(
    state: &AppState,
    request: &AnalysisRequest,
    _in_flight: AnalysisGuard<'_>,
) -> Result<AnalysisResult, AnalysisError> {
    let outcome = match state.analyzer.generate(request).await {
        Ok(raw) => parse_analysis(&raw),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            info!(items = result.items.len(), "analysis ready for review");
            state.session.set_pending(result.clone());
            Ok(result)
        }
        Err(e) => {
            warn!(error = %e, "analysis failed");
            Err(e)
        }
    }
}
