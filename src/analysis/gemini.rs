//! Google Gemini `generateContent` client constrained to the analysis schema.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::error::AnalysisError;
use super::services::{AnalysisRequest, FoodAnalyzer, RequestPart};
use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Response schema in Gemini's OpenAPI subset.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "portion": { "type": "STRING" },
                        "calories": { "type": "NUMBER" },
                        "macros": {
                            "type": "OBJECT",
                            "properties": {
                                "protein": { "type": "NUMBER" },
                                "fat": { "type": "NUMBER" },
                                "carbs": { "type": "NUMBER" }
                            },
                            "required": ["protein", "fat", "carbs"]
                        },
                        "micros": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "name": { "type": "STRING" },
                                    "amount": { "type": "NUMBER" },
                                    "unit": { "type": "STRING" }
                                },
                                "required": ["name", "amount", "unit"]
                            }
                        }
                    },
                    "required": ["name", "portion", "calories", "macros"]
                }
            },
            "summary": { "type": "STRING" },
            "gapAnalysis": {
                "type": "STRING",
                "description": "Suggest foods to fill nutrient gaps based on the user's current intake vs common RDAs"
            }
        },
        "required": ["items", "summary", "gapAnalysis"]
    })
}

pub struct GeminiAnalyzer {
    client: Client,
    config: GeminiConfig,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build gemini http client")?;
        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn wire_request(request: &AnalysisRequest) -> GenerateContentRequest {
        let parts = request
            .parts
            .iter()
            .map(|p| match p {
                RequestPart::Text(text) => Part::Text { text: text.clone() },
                RequestPart::InlineImage { mime_type, data } => Part::Inline {
                    inline_data: InlineData {
                        mime_type: *mime_type,
                        data: data.clone(),
                    },
                },
            })
            .collect();

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: analysis_schema(),
            },
        }
    }

    fn extract_text(body: &str) -> Result<String, AnalysisError> {
        let response: GenerateContentResponse = serde_json::from_str(body)
            .map_err(|e| AnalysisError::Malformed(format!("gemini envelope: {e}")))?;

        if let Some(err) = response.error {
            return Err(AnalysisError::Failed(err.message));
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| AnalysisError::Malformed("no candidates in response".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(AnalysisError::Malformed(format!(
                "empty candidate (finish reason: {reason})"
            )));
        }
        Ok(text)
    }

    fn api_error_message(body: &str) -> String {
        serde_json::from_str::<GenerateContentResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_owned(), |e| e.message)
    }
}

#[async_trait]
impl FoodAnalyzer for GeminiAnalyzer {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let body = Self::wire_request(request);
        debug!(parts = request.parts.len(), "sending analysis request");

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "gemini request failed");
                AnalysisError::Failed(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AnalysisError::Failed(format!("read response: {e}")))?;

        if !status.is_success() {
            let message = Self::api_error_message(&text);
            error!(%status, %message, "gemini api error");
            return Err(AnalysisError::Failed(format!("HTTP {status}: {message}")));
        }

        Self::extract_text(&text)
    }
}
