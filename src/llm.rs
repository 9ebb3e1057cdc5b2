use std::future::Future;

use anyhow::{bail, Context, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model override; the client default is used when unset. Travels in the URL, not the body.
    #[serde(skip)]
    pub model: Option<String>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

/// Retrieval tools the model may invoke while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GoogleSearch,
    GoogleMaps,
}

impl Tool {
    fn key(self) -> &'static str {
        match self {
            Tool::GoogleSearch => "googleSearch",
            Tool::GoogleMaps => "googleMaps",
        }
    }
}

// The API expects `{"googleSearch": {}}`, not a bare string.
impl Serialize for Tool {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key(), &serde_json::Map::new())?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
    /// Reasoning parts emitted by thinking models; never shown to users.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

/// One piece of retrieval evidence. Exactly which sub-object is set depends on
/// the tool that produced it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    pub status: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, skipping thought parts.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn grounding_chunks(&self) -> Option<&[GroundingChunk]> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .and_then(|m| m.grounding_chunks.as_deref())
    }
}

/// Anything that can answer a `generateContent` request.
pub trait ContentGenerator: Send + Sync {
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<GenerateResponse>> + Send;
}

pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_env() -> Result<Self> {
        let base_url =
            dotenv::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = dotenv::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = dotenv::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .context("GEMINI_API_KEY required")?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the `generateContent` endpoint for a model from the base URL.
    fn endpoint(&self, model: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/models") {
            format!("{}/{}:generateContent", base, model)
        } else {
            format!("{}/models/{}:generateContent", base, model)
        }
    }
}

impl ContentGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let model = request.model.as_deref().unwrap_or(&self.model);

        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read Gemini response")?;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map(|e| format!("{} ({})", e.message, e.status.unwrap_or_default()))
                .unwrap_or(text);
            bail!("Gemini API error {}: {}", status, message);
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).context("Failed to parse Gemini JSON")?;
        if let Some(err) = &parsed.error {
            bail!("Gemini API error: {}", err.message);
        }

        debug!(
            model,
            candidates = parsed.candidates.len(),
            finish_reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none"),
            chunks = parsed.grounding_chunks().map_or(0, |c| c.len()),
            "Gemini response received"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case_with_tool_objects() {
        let request = GenerateRequest {
            model: Some("ignored-in-body".to_string()),
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: "AAAA".to_string(),
                        },
                    },
                    Part::Text {
                        text: "hello".to_string(),
                    },
                ],
            }],
            tools: vec![Tool::GoogleMaps],
            tool_config: Some(ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: 40.5,
                        longitude: -73.25,
                    },
                },
            }),
            generation_config: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                        {"text": "hello"}
                    ]
                }],
                "tools": [{"googleMaps": {}}],
                "toolConfig": {"retrievalConfig": {"latLng": {"latitude": 40.5, "longitude": -73.25}}}
            })
        );
    }

    #[test]
    fn test_request_omits_empty_tools_and_config() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: "hi".to_string(),
                }],
            }],
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("toolConfig").is_none());
        assert!(value.get("generationConfig").is_none());
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_response_text_joins_parts_and_skips_thoughts() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "CONFIDENCE_SCORE: 70"},
                    {"text": " | CONFIDENCE_LABEL: Medium\nBody"}
                ]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://a.example", "title": "A"}},
                        {"maps": {"uri": "https://maps.example/1", "title": "Clinic", "address": "1 Main St"}}
                    ]
                }
            }]
        });
        let resp: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            resp.text(),
            "CONFIDENCE_SCORE: 70 | CONFIDENCE_LABEL: Medium\nBody"
        );
        let chunks = resp.grounding_chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].maps.as_ref().unwrap().address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.text(), "");
        assert!(resp.grounding_chunks().is_none());
    }

    #[test]
    fn test_endpoint_resolution() {
        let mut client = GeminiClient {
            client: reqwest::Client::new(),
            base_url: "https://host/v1beta/".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: "k".to_string(),
        };
        assert_eq!(
            client.endpoint("m"),
            "https://host/v1beta/models/m:generateContent"
        );
        client.base_url = "https://host/v1beta/models".to_string();
        assert_eq!(
            client.endpoint("m"),
            "https://host/v1beta/models/m:generateContent"
        );
    }
}
