// src/error.rs
// Error taxonomy for the analysis flow

use thiserror::Error;

/// Message returned when the request carries no `video` part
pub const NO_VIDEO_MESSAGE: &str = "No video file uploaded";

/// Message returned when the uploaded file has a disallowed extension
pub const INVALID_FILE_TYPE_MESSAGE: &str = "Invalid file type. Allowed types: mp4, avi, mov";

/// Errors produced while handling one analysis request
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Client-caused: missing or disallowed upload, malformed request body
    #[error("{0}")]
    Validation(String),

    /// An analyzer failed or the analysis timed out. The message is surfaced verbatim.
    #[error("{0}")]
    Processing(String),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

/// Convenience type alias for Result using AnalyzeError
pub type Result<T> = std::result::Result<T, AnalyzeError>;

impl AnalyzeError {
    pub fn no_video() -> Self {
        AnalyzeError::Validation(NO_VIDEO_MESSAGE.to_string())
    }

    pub fn invalid_file_type() -> Self {
        AnalyzeError::Validation(INVALID_FILE_TYPE_MESSAGE.to_string())
    }

    /// True for errors the client caused
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalyzeError::Validation(_))
    }
}

/// Failures reported by a video or audio analyzer
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("failed to start {analyzer} analyzer `{program}`: {source}")]
    Spawn {
        analyzer: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{analyzer} analyzer failed ({status}){}", format_stderr(.stderr))]
    Exit {
        analyzer: &'static str,
        status: String,
        stderr: String,
    },

    #[error("{analyzer} analyzer returned invalid output: {source}")]
    InvalidOutput {
        analyzer: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Free-form failure, displayed as-is
    #[error("{0}")]
    Failed(String),
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl From<AnalyzerError> for AnalyzeError {
    fn from(err: AnalyzerError) -> Self {
        AnalyzeError::Processing(err.to_string())
    }
}
