// src/analyzer/mod.rs
// Analyzer capabilities consumed by the analysis pipeline

pub mod command;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

pub use command::{AnalyzerCommand, CommandAnalyzer};

/// Score and feedback produced by one analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Score in the analyzer's own range
    pub score: f64,
    /// Human-readable feedback
    pub feedback: String,
}

impl AnalysisResult {
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score,
            feedback: feedback.into(),
        }
    }
}

/// Inspects the visual track of a recording (posture, gaze, gestures)
#[async_trait]
pub trait VideoAnalyzer: Send + Sync {
    async fn analyze_video(&self, path: &Path) -> Result<AnalysisResult, AnalyzerError>;
}

/// Inspects the spoken answer of a recording against the question asked
#[async_trait]
pub trait AudioAnalyzer: Send + Sync {
    async fn analyze_audio(
        &self,
        path: &Path,
        question: &str,
    ) -> Result<AnalysisResult, AnalyzerError>;
}
