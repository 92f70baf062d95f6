// src/analyzer/command.rs
// Analyzers backed by external programs
//
// The program receives the recording path (and, for audio, the question) as
// trailing arguments and prints `{"score": <number>, "feedback": <string>}`
// on stdout.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{AnalysisResult, AudioAnalyzer, VideoAnalyzer};
use crate::error::AnalyzerError;

/// Program plus fixed leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AnalyzerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl FromStr for AnalyzerCommand {
    type Err = String;

    /// Parse a whitespace-separated command line, e.g. `python3 video_processor.py`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| "analyzer command is empty".to_string())?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl fmt::Display for AnalyzerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs an [`AnalyzerCommand`] once per recording
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    command: AnalyzerCommand,
}

impl CommandAnalyzer {
    pub fn new(command: AnalyzerCommand) -> Self {
        Self { command }
    }

    async fn run(
        &self,
        analyzer: &'static str,
        extra_args: &[&std::ffi::OsStr],
    ) -> Result<AnalysisResult, AnalyzerError> {
        let start = Instant::now();
        info!(analyzer, command = %self.command, "Starting {} processing", analyzer);

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AnalyzerError::Spawn {
                analyzer,
                program: self.command.program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            debug!(analyzer, "{}", stderr);
        }

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(AnalyzerError::Exit {
                analyzer,
                status,
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = parse_output(&stdout)
            .map_err(|source| AnalyzerError::InvalidOutput { analyzer, source })?;

        info!(
            analyzer,
            score = result.score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finished {} processing",
            analyzer
        );
        Ok(result)
    }
}

/// Parse analyzer stdout. Accepts a lone JSON object, or log lines followed
/// by the JSON object on the last non-empty line.
fn parse_output(stdout: &str) -> Result<AnalysisResult, serde_json::Error> {
    let trimmed = stdout.trim();
    match serde_json::from_str(trimmed) {
        Ok(result) => Ok(result),
        Err(err) => {
            let last_line = trimmed.lines().rev().map(str::trim).find(|l| !l.is_empty());
            match last_line {
                Some(line) if line != trimmed => serde_json::from_str(line).map_err(|_| err),
                _ => Err(err),
            }
        }
    }
}

#[async_trait]
impl VideoAnalyzer for CommandAnalyzer {
    async fn analyze_video(&self, path: &Path) -> Result<AnalysisResult, AnalyzerError> {
        self.run("video", &[path.as_os_str()]).await
    }
}

#[async_trait]
impl AudioAnalyzer for CommandAnalyzer {
    async fn analyze_audio(
        &self,
        path: &Path,
        question: &str,
    ) -> Result<AnalysisResult, AnalyzerError> {
        self.run("audio", &[path.as_os_str(), std::ffi::OsStr::new(question)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        let cmd: AnalyzerCommand = "python3  scripts/video_processor.py --fast".parse().unwrap();
        assert_eq!(cmd.program, "python3");
        assert_eq!(cmd.args, vec!["scripts/video_processor.py", "--fast"]);
        assert_eq!(cmd.to_string(), "python3 scripts/video_processor.py --fast");

        assert!("   ".parse::<AnalyzerCommand>().is_err());
    }

    #[test]
    fn test_parse_output() {
        let result = parse_output("{\"score\": 8, \"feedback\": \"good posture\"}\n").unwrap();
        assert_eq!(result, AnalysisResult::new(8.0, "good posture"));

        let result = parse_output("loading model...\nextracting frames\n{\"score\": 6.5, \"feedback\": \"ok\"}\n")
            .unwrap();
        assert_eq!(result, AnalysisResult::new(6.5, "ok"));

        let pretty = "{\n  \"score\": 4,\n  \"feedback\": \"slouching\"\n}";
        assert_eq!(parse_output(pretty).unwrap().feedback, "slouching");

        assert!(parse_output("").is_err());
        assert!(parse_output("done").is_err());
        assert!(parse_output("{\"score\": \"high\", \"feedback\": \"x\"}").is_err());
    }

    #[cfg(unix)]
    fn sh(script: &str) -> CommandAnalyzer {
        // `sh -c <script> sh <path> [question]` exposes the trailing args as $1, $2
        CommandAnalyzer::new(AnalyzerCommand::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        ))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_video_analyzer_receives_path() {
        let analyzer = sh(r#"printf '{"score": 7.5, "feedback": "%s"}' "$1""#);
        let result = analyzer.analyze_video(Path::new("uploads/answer.mp4")).await.unwrap();
        assert_eq!(result, AnalysisResult::new(7.5, "uploads/answer.mp4"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audio_analyzer_receives_question() {
        let analyzer = sh(r#"printf '{"score": 9, "feedback": "%s"}' "$2""#);
        let result = analyzer
            .analyze_audio(Path::new("uploads/answer.mp4"), "Tell me about yourself")
            .await
            .unwrap();
        assert_eq!(result.score, 9.0);
        assert_eq!(result.feedback, "Tell me about yourself");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let analyzer = sh("echo 'no audio stream' >&2; exit 3");
        let err = analyzer
            .analyze_audio(Path::new("answer.mp4"), "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "audio analyzer failed (exit code 3): no audio stream");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_output() {
        let analyzer = sh("echo 'not json'");
        let err = analyzer.analyze_video(Path::new("answer.mp4")).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidOutput { analyzer: "video", .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let analyzer = CommandAnalyzer::new(AnalyzerCommand::new(
            "/nonexistent/interview-analyzer-test-bin",
            vec![],
        ));
        let err = analyzer.analyze_video(Path::new("answer.mp4")).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/interview-analyzer-test-bin"));
    }
}
