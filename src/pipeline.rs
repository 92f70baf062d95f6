// src/pipeline.rs
// Analysis flow for a recording already on disk

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::{AnalysisResult, AudioAnalyzer, VideoAnalyzer};
use crate::error::{AnalyzeError, Result};
use crate::scoring::final_score;
use crate::upload::allowed_file;

/// Result returned to the client for one recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub question: String,
    pub final_score: f64,
    /// Video analyzer feedback
    pub body_language: String,
    /// Audio analyzer feedback
    pub answer_quality: String,
}

impl ScoreResponse {
    pub fn from_results(question: &str, video: AnalysisResult, audio: AnalysisResult) -> Self {
        Self {
            question: question.to_string(),
            final_score: final_score(audio.score, video.score),
            body_language: video.feedback,
            answer_quality: audio.feedback,
        }
    }
}

/// Runs both analyzers on a recording and combines their scores
#[derive(Clone)]
pub struct AnalysisPipeline {
    video: Arc<dyn VideoAnalyzer>,
    audio: Arc<dyn AudioAnalyzer>,
    timeout: Duration,
}

impl AnalysisPipeline {
    pub fn new(
        video: Arc<dyn VideoAnalyzer>,
        audio: Arc<dyn AudioAnalyzer>,
        timeout: Duration,
    ) -> Self {
        Self {
            video,
            audio,
            timeout,
        }
    }

    /// Analyze the recording at `path`.
    ///
    /// The video analyzer runs first; a failure in either one aborts the run.
    /// Both calls together are bounded by the configured timeout, and on expiry
    /// the in-flight analyzer future is dropped.
    pub async fn run(&self, path: &Path, question: &str) -> Result<ScoreResponse> {
        match tokio::time::timeout(self.timeout, self.analyze(path, question)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(path = %path.display(), timeout = ?self.timeout, "Analysis timed out");
                Err(AnalyzeError::Processing(format!(
                    "Analysis timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    /// Analyze a recording the caller already owns.
    ///
    /// Applies the same extension check as an upload but never copies or
    /// removes the file.
    pub async fn run_file(&self, file: &Path, question: &str) -> Result<ScoreResponse> {
        if !file.is_file() {
            return Err(AnalyzeError::Validation(format!(
                "{} is not a file",
                file.display()
            )));
        }

        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !allowed_file(&filename) {
            return Err(AnalyzeError::invalid_file_type());
        }

        self.run(file, question).await
    }

    async fn analyze(&self, path: &Path, question: &str) -> Result<ScoreResponse> {
        let video = self.video.analyze_video(path).await?;
        let audio = self.audio.analyze_audio(path, question).await?;

        let response = ScoreResponse::from_results(question, video, audio);
        info!(
            final_score = response.final_score,
            question_len = question.len(),
            "Analysis complete"
        );
        Ok(response)
    }
}
