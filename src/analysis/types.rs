use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE_LABEL: &str = "Low";

/// Model-reported certainty, parsed from the leading confidence line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confidence {
    /// 0-100 as instructed; the model's literal value is kept even when out of range.
    pub score: u32,
    /// `High`, `Medium` or `Low` as instructed.
    pub label: String,
}

impl Default for Confidence {
    fn default() -> Self {
        Self {
            score: 0,
            label: DEFAULT_CONFIDENCE_LABEL.to_string(),
        }
    }
}

/// Web citation returned by the search tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Citation returned by the maps tool (or a web fallback, which never has an address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSource {
    pub title: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Markdown body with the confidence line removed.
    pub content: String,
    pub confidence: Confidence,
    pub language: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
}

/// Doctor-finder answer. Only ever shown, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorSearchResult {
    pub content: String,
    pub map_sources: Vec<MapSource>,
}

/// An image attached to an analysis request.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}
