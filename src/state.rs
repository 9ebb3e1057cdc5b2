use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analysis::{ModelOptions, SymptomAnalyzer};
use crate::history::HistoryStore;
use crate::llm::GeminiClient;
use crate::requests::RequestTracker;

/// Runtime analysis settings (admins can modify at runtime).
pub struct AnalysisConfig {
    pub default_language: String,
    /// Overrides the client's model when set.
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_language: "English".to_string(),
            model: None,
            temperature: None,
        }
    }
}

impl AnalysisConfig {
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

pub struct AppState {
    pub analyzer: Arc<SymptomAnalyzer<GeminiClient>>,
    pub history: Arc<HistoryStore>,
    pub requests: RequestTracker,
    pub admin_ids: HashSet<u64>,
    pub config: Arc<RwLock<AnalysisConfig>>,
}

impl AppState {
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;
