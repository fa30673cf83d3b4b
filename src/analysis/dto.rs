use serde::{Deserialize, Serialize};

use crate::logs::FoodEntry;

/// Structured estimate returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub items: Vec<AnalyzedItem>,
    pub summary: String,
    pub gap_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedItem {
    pub name: String,
    pub portion: String,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub micros: Vec<Micro>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Micro {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBase64Request {
    pub image_b64: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub added: Vec<FoodEntry>,
    pub log_len: usize,
}

#[derive(Debug, Serialize)]
pub struct DismissResponse {
    pub dismissed: bool,
}
