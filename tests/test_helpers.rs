// tests/test_helpers.rs
// Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use interview_analyzer::config::ServerConfig;
use interview_analyzer::{AnalysisResult, AnalyzerError, AppState, AudioAnalyzer, VideoAnalyzer};

pub const BOUNDARY: &str = "interview-analyzer-test-boundary";

/// Stand-in recording bytes used by [`video_request`]
pub const RECORDING: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake recording";

/// Path handed to an analyzer and whether it existed at call time
#[derive(Debug, Clone)]
pub struct SeenPath {
    pub path: PathBuf,
    pub existed: bool,
    pub question: Option<String>,
}

/// Analyzer returning a fixed outcome and recording every call
pub struct StubAnalyzer {
    outcome: Result<AnalysisResult, String>,
    calls: Mutex<Vec<SeenPath>>,
}

impl StubAnalyzer {
    pub fn ok(score: f64, feedback: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(AnalysisResult::new(score, feedback)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<SeenPath> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, path: &Path, question: Option<&str>) -> Result<AnalysisResult, AnalyzerError> {
        self.calls.lock().unwrap().push(SeenPath {
            path: path.to_path_buf(),
            existed: path.exists(),
            question: question.map(str::to_string),
        });
        self.outcome.clone().map_err(AnalyzerError::Failed)
    }
}

#[async_trait]
impl VideoAnalyzer for StubAnalyzer {
    async fn analyze_video(&self, path: &Path) -> Result<AnalysisResult, AnalyzerError> {
        self.record(path, None)
    }
}

#[async_trait]
impl AudioAnalyzer for StubAnalyzer {
    async fn analyze_audio(
        &self,
        path: &Path,
        question: &str,
    ) -> Result<AnalysisResult, AnalyzerError> {
        self.record(path, Some(question))
    }
}

/// Router wired to stub analyzers and a per-test upload directory
pub fn create_test_app(
    config: ServerConfig,
    video: Arc<StubAnalyzer>,
    audio: Arc<StubAnalyzer>,
) -> axum::Router {
    config.prepare_upload_dir().expect("create upload dir");
    interview_analyzer::create_router(AppState::new(config, video, audio))
}

/// One part of a multipart/form-data body
pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST /analyze with the given multipart parts
pub fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Typical request: a video part plus a question
pub fn video_request(filename: &str, question: &str) -> Request<Body> {
    analyze_request(&[
        Part::File {
            name: "video",
            filename,
            content: RECORDING,
        },
        Part::Text {
            name: "questionText",
            value: question,
        },
    ])
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Number of entries left in the upload directory
pub fn upload_dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
