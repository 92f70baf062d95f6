// src/main.rs
// interview-analyzer - scores recorded interview answers

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use interview_analyzer::analyzer::AnalyzerCommand;
use interview_analyzer::config::{self, AnalyzerConfig, ServerConfig};
use interview_analyzer::pipeline::AnalysisPipeline;
use interview_analyzer::{server, AppState};

#[derive(Parser)]
#[command(name = "interview-analyzer")]
#[command(about = "Scores recorded interview answers from video and audio analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video analyzer command line, e.g. "python3 video_processor.py"
    #[arg(long = "video-analyzer", env = "VIDEO_ANALYZER_CMD", global = true)]
    video_analyzer: Option<AnalyzerCommand>,

    /// Audio analyzer command line, e.g. "python3 audio_processor.py"
    #[arg(long = "audio-analyzer", env = "AUDIO_ANALYZER_CMD", global = true)]
    audio_analyzer: Option<AnalyzerCommand>,

    /// Seconds allowed for both analyzers together
    #[arg(long, env = "ANALYSIS_TIMEOUT_SECS", default_value_t = config::DEFAULT_ANALYSIS_TIMEOUT_SECS, global = true)]
    analysis_timeout_secs: u64,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = config::DEFAULT_HOST, global = true)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT, global = true)]
    port: u16,

    /// Directory for in-flight uploads (created if missing)
    #[arg(long, env = "UPLOAD_DIR", default_value = config::DEFAULT_UPLOAD_DIR, global = true)]
    upload_dir: PathBuf,

    /// Maximum request body size for /analyze, in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = config::DEFAULT_MAX_UPLOAD_MB, global = true)]
    max_upload_mb: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Analyze a local recording and print the score as JSON
    Analyze {
        /// Recording to analyze (mp4, avi or mov)
        #[arg(short, long)]
        file: PathBuf,

        /// Interview question the recording answers
        #[arg(short, long, default_value = "")]
        question: String,
    },
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_mb * 1024 * 1024,
            analysis_timeout: Duration::from_secs(self.analysis_timeout_secs),
        }
    }

    fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        let video = self
            .video_analyzer
            .clone()
            .context("VIDEO_ANALYZER_CMD (or --video-analyzer) must be set")?;
        let audio = self
            .audio_analyzer
            .clone()
            .context("AUDIO_ANALYZER_CMD (or --audio-analyzer) must be set")?;
        Ok(AnalyzerConfig { video, audio })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let server_config = cli.server_config();
    let analyzers = cli.analyzer_config()?;

    info!(video = %analyzers.video, audio = %analyzers.audio, "Analyzers configured");

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = AppState::new(
                server_config,
                analyzers.video_analyzer(),
                analyzers.audio_analyzer(),
            );
            server::run(state).await
        }
        Commands::Analyze { file, question } => {
            let pipeline = AnalysisPipeline::new(
                analyzers.video_analyzer(),
                analyzers.audio_analyzer(),
                server_config.analysis_timeout,
            );
            let response = pipeline.run_file(&file, &question).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}
