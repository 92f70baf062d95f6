// src/config/mod.rs
// Server and analyzer configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::analyzer::{AnalyzerCommand, AudioAnalyzer, CommandAnalyzer, VideoAnalyzer};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 512;
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 600;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding in-flight uploads
    pub upload_dir: PathBuf,
    /// Request body limit for /analyze, in bytes
    pub max_upload_bytes: usize,
    /// Upper bound on both analyzer calls together
    pub analysis_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Config rooted at a specific upload directory, everything else default
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the upload directory if it does not exist yet
    pub fn prepare_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        info!(upload_dir = %self.upload_dir.display(), "Upload directory ready");
        Ok(())
    }
}

/// External programs used for analysis
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub video: AnalyzerCommand,
    pub audio: AnalyzerCommand,
}

impl AnalyzerConfig {
    pub fn video_analyzer(&self) -> Arc<dyn VideoAnalyzer> {
        Arc::new(CommandAnalyzer::new(self.video.clone()))
    }

    pub fn audio_analyzer(&self) -> Arc<dyn AudioAnalyzer> {
        Arc::new(CommandAnalyzer::new(self.audio.clone()))
    }
}
