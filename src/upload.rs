// src/upload.rs
// Upload validation, filename sanitizing and request-scoped temp files

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Extensions accepted for video uploads (compared lowercase)
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

/// Fallback stem when sanitizing leaves nothing usable
const FALLBACK_NAME: &str = "upload";

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

/// Check that a client filename ends in an allowed extension.
///
/// The extension is whatever follows the last `.`, so `clip.final.MOV` passes
/// and `mp4` (no dot) does not.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reduce a client filename to a safe single path component.
///
/// Path separators become spaces, whitespace runs become `_`, every character
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and
/// underscores are stripped, so the result can never climb out of the upload
/// directory.
pub fn sanitize_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(['.', '_']);

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Unique on-disk name for an upload: `<uuid>-<sanitized name>`
pub fn unique_filename(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename))
}

/// A file in the upload directory owned by a single request.
///
/// The file is removed when the guard is dropped, whatever path the request
/// took to get there (success, error, panic or cancellation).
#[derive(Debug)]
pub struct ScopedUpload {
    path: PathBuf,
    file: Option<File>,
}

impl ScopedUpload {
    /// Create an empty upload file for `filename` under `upload_dir`
    pub async fn create(upload_dir: &Path, filename: &str) -> std::io::Result<Self> {
        let path = upload_dir.join(unique_filename(filename));
        let file = File::create(&path).await?;
        debug!(path = %path.display(), "Created upload file");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Append a chunk of the upload
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await,
            None => Err(std::io::Error::other("upload already finished")),
        }
    }

    /// Flush and close the file so analyzers see the full contents
    pub async fn finish(&mut self) -> std::io::Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedUpload {
    fn drop(&mut self) {
        // Close the handle before unlinking
        self.file.take();
        remove_upload(&self.path);
    }
}

/// Delete an upload, ignoring a file that is already gone.
/// Other failures are logged and swallowed.
///
/// Runs synchronously because it is called from `Drop`: a spawned task could
/// be lost on runtime shutdown, and the file must be gone before the response
/// is sent. A single unlink is short enough to do on a worker thread.
pub fn remove_upload(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed upload file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload file"),
    }
}
