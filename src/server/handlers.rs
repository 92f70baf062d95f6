//! HTTP handlers for analysis and health

use std::path::Path;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::AppState;
use crate::api::{ApiError, ApiResult};
use crate::error::AnalyzeError;
use crate::pipeline::ScoreResponse;
use crate::upload::{allowed_file, ScopedUpload};

const VIDEO_FIELD: &str = "video";
const QUESTION_FIELD: &str = "questionText";

/// The `video` part as received
enum VideoPart {
    /// Allowed extension, stored in the upload directory
    Saved(ScopedUpload),
    /// Disallowed or missing extension, never written to disk
    Rejected(String),
}

#[derive(Default)]
struct AnalyzeForm {
    video: Option<VideoPart>,
    question: Option<String>,
}

/// Analyze an uploaded recording.
///
/// The stored upload is removed before the response is returned, whether the
/// analyzers succeeded or not.
pub async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ScoreResponse>> {
    // A body that is not multipart carries no files at all
    let Ok(mut multipart) = multipart else {
        return Err(AnalyzeError::no_video().into());
    };

    let form = read_form(&mut multipart, &state.config.upload_dir).await?;

    let upload = match form.video {
        None => return Err(AnalyzeError::no_video().into()),
        Some(VideoPart::Rejected(filename)) => {
            debug!(filename = %filename, "Rejected upload with disallowed extension");
            return Err(AnalyzeError::invalid_file_type().into());
        }
        Some(VideoPart::Saved(upload)) => upload,
    };
    let question = form.question.unwrap_or_default();

    let result = state.pipeline.run(upload.path(), &question).await;
    drop(upload);

    Ok(Json(result?))
}

/// Read the multipart fields, streaming an acceptable `video` part to disk.
///
/// Only the first `video` file part and the first `questionText` part are
/// used. A `video` part without a filename is a plain form field, not a file,
/// and is ignored.
async fn read_form(multipart: &mut Multipart, upload_dir: &Path) -> ApiResult<AnalyzeForm> {
    let mut form = AnalyzeForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(VIDEO_FIELD) if form.video.is_none() => {
                let Some(filename) = field.file_name().map(str::to_string) else {
                    continue;
                };

                if !allowed_file(&filename) {
                    form.video = Some(VideoPart::Rejected(filename));
                    continue;
                }

                let mut upload = ScopedUpload::create(upload_dir, &filename)
                    .await
                    .map_err(AnalyzeError::from)?;
                let mut size = 0usize;
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    size += chunk.len();
                    upload.write_chunk(&chunk).await.map_err(AnalyzeError::from)?;
                }
                upload.finish().await.map_err(AnalyzeError::from)?;

                info!(
                    filename = %filename,
                    bytes = size,
                    path = %upload.path().display(),
                    "Saved upload"
                );
                form.video = Some(VideoPart::Saved(upload));
            }
            Some(QUESTION_FIELD) if form.question.is_none() => {
                form.question = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::custom(err.status(), err.body_text())
}

/// Health check: the service is usable while the upload directory exists
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let upload_dir = &state.config.upload_dir;
    let healthy = tokio::fs::metadata(upload_dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unhealthy" },
            "uploadDir": upload_dir.display().to_string(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
