pub mod citations;
pub mod confidence;
pub mod prompts;
pub mod types;

use std::sync::Arc;

use base64::Engine;
use tracing::{info, warn};

use crate::llm::{
    Content, ContentGenerator, GenerateRequest, GenerationConfig, InlineData, LatLng, Part,
    RetrievalConfig, Tool, ToolConfig,
};
use crate::location::{self, Coordinates, LocateError, LocationProvider, PositionOptions};

use citations::{extract_map_sources, extract_web_sources};
use confidence::parse_response;
use types::{AnalysisResult, DoctorSearchResult, ImageInput};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Symptom analysis failed. Every cause surfaces as the same message.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Failed to analyze symptoms. Please check your internet connection or try a different image.")]
    Request(#[source] BoxError),
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorLookupError {
    #[error("Location access was denied. Share your latitude and longitude to find doctors near you.")]
    PermissionDenied,
    #[error("Location information is unavailable. Check the coordinates you shared and try again.")]
    PositionUnavailable,
    #[error("The request to get your location timed out. Please try again.")]
    Timeout,
    #[error("Unable to find doctors near you. Please check your connection and location settings, then try again.")]
    Failed(#[source] BoxError),
}

impl From<LocateError> for DoctorLookupError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::PermissionDenied => DoctorLookupError::PermissionDenied,
            LocateError::PositionUnavailable => DoctorLookupError::PositionUnavailable,
            LocateError::Timeout => DoctorLookupError::Timeout,
        }
    }
}

/// Per-call model knobs (admin-tunable at runtime).
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl ModelOptions {
    fn generation_config(&self) -> Option<GenerationConfig> {
        self.temperature.map(|t| GenerationConfig {
            temperature: Some(t),
        })
    }
}

pub struct SymptomAnalyzer<G> {
    llm: Arc<G>,
}

impl<G: ContentGenerator> SymptomAnalyzer<G> {
    pub fn new(llm: Arc<G>) -> Self {
        Self { llm }
    }

    /// Run one search-grounded analysis of text and/or image symptoms.
    pub async fn analyze(
        &self,
        symptoms: &str,
        image: Option<&ImageInput>,
        language: &str,
        options: &ModelOptions,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = prompts::build_analysis_prompt(symptoms, image.is_some(), language);

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                },
            });
        }
        parts.push(Part::Text { text: prompt });

        let request = GenerateRequest {
            model: options.model.clone(),
            contents: vec![Content { parts }],
            tools: vec![Tool::GoogleSearch],
            tool_config: None,
            generation_config: options.generation_config(),
        };

        let response = self.llm.generate(&request).await.map_err(|e| {
            warn!(error = %e, "symptom analysis request failed");
            AnalysisError::Request(e.into())
        })?;

        let parsed = parse_response(&response.text());
        let sources = extract_web_sources(response.grounding_chunks());

        info!(
            score = parsed.confidence.score,
            label = %parsed.confidence.label,
            sources = sources.len(),
            language,
            "symptom analysis complete"
        );

        Ok(AnalysisResult {
            content: parsed.body,
            confidence: parsed.confidence,
            language: language.to_string(),
            sources,
        })
    }

    /// Ask the maps-grounded model for nearby providers of the right specialty.
    pub async fn find_doctors(
        &self,
        symptoms: &str,
        coords: Coordinates,
        options: &ModelOptions,
    ) -> Result<DoctorSearchResult, DoctorLookupError> {
        let request = GenerateRequest {
            model: options.model.clone(),
            contents: vec![Content {
                parts: vec![Part::Text {
                    text: prompts::build_doctor_prompt(symptoms),
                }],
            }],
            tools: vec![Tool::GoogleMaps],
            tool_config: Some(ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: coords.latitude,
                        longitude: coords.longitude,
                    },
                },
            }),
            generation_config: options.generation_config(),
        };

        let response = self.llm.generate(&request).await.map_err(|e| {
            warn!(error = %e, "doctor lookup request failed");
            DoctorLookupError::Failed(e.into())
        })?;

        let map_sources = extract_map_sources(response.grounding_chunks());
        info!(places = map_sources.len(), "doctor lookup complete");

        Ok(DoctorSearchResult {
            content: response.text(),
            map_sources,
        })
    }

    /// Resolve the user's position, then look up doctors around it.
    pub async fn locate_and_find_doctors<P: LocationProvider>(
        &self,
        provider: &P,
        symptoms: &str,
        options: &ModelOptions,
    ) -> Result<DoctorSearchResult, DoctorLookupError> {
        let coords = location::locate(provider, &PositionOptions::default()).await?;
        self.find_doctors(symptoms, coords, options).await
    }
}
