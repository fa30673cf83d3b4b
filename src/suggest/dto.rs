use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct ApplySuggestionRequest {
    pub text: String,
    pub choice: String,
}

#[derive(Debug, Serialize)]
pub struct ApplySuggestionResponse {
    pub text: String,
    /// Always empty once a choice is applied.
    pub suggestions: Vec<&'static str>,
}
