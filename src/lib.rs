// src/lib.rs
// Interview recording analysis service

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod server;
pub mod upload;

pub use analyzer::{AnalysisResult, AudioAnalyzer, VideoAnalyzer};
pub use error::{AnalyzeError, AnalyzerError};
pub use pipeline::{AnalysisPipeline, ScoreResponse};
pub use server::{create_router, AppState};
