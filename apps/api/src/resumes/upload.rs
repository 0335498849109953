//! Two-phase resume storage: the upload is staged in a temporary file next to
//! its final location, text is extracted from it, and only then is it moved
//! into place. A failed extraction leaves nothing behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::errors::AppError;
use crate::text::extract::{extract_text, DocumentKind};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const RESUME_SUBDIR: &str = "resumes";

/// Checks the name and size of an upload before anything touches the disk.
pub fn validate_upload(file_name: &str, size: usize) -> Result<DocumentKind, AppError> {
    let kind = DocumentKind::from_file_name(file_name).ok_or_else(|| {
        AppError::Validation("file: only PDF and DOCX files are accepted".to_string())
    })?;
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "file: file size must not exceed 5 MB".to_string(),
        ));
    }
    if size == 0 {
        return Err(AppError::Validation("file: the submitted file is empty".to_string()));
    }
    Ok(kind)
}

/// An upload written to a temporary file whose text has been extracted.
#[derive(Debug)]
pub struct StagedUpload {
    temp: NamedTempFile,
    pub id: Uuid,
    pub kind: DocumentKind,
    pub text: String,
}

impl StagedUpload {
    /// Path of the stored file relative to the media directory.
    pub fn relative_path(&self) -> String {
        format!("{RESUME_SUBDIR}/{}.{}", self.id, self.kind.extension())
    }

    /// Moves the staged file to its final name under `media_dir`.
    pub fn persist(self, media_dir: &Path) -> Result<PathBuf, std::io::Error> {
        let target = media_dir.join(self.relative_path());
        self.temp.persist(&target).map_err(|e| e.error)?;
        Ok(target)
    }
}

/// Writes `bytes` to a temporary file in `<media_dir>/resumes/` and extracts
/// its text. Blocking; call from `spawn_blocking`.
///
/// Failures to write the staging file are internal errors; only a document
/// that cannot be parsed is reported as an extraction error.
pub fn stage_upload(
    media_dir: &Path,
    kind: DocumentKind,
    bytes: &[u8],
) -> Result<StagedUpload, AppError> {
    let dir = media_dir.join(RESUME_SUBDIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(".upload-")
        .suffix(&format!(".{}", kind.extension()))
        .tempfile_in(&dir)
        .with_context(|| format!("could not stage upload in {}", dir.display()))?;
    temp.write_all(bytes)
        .and_then(|()| temp.flush())
        .context("could not write staged upload")?;
    let text = extract_text(temp.path())?;
    Ok(StagedUpload {
        temp,
        id: Uuid::new_v4(),
        kind,
        text,
    })
}

/// Best-effort removal of a stored upload.
pub fn remove_stored_file(media_dir: &Path, relative: &str) {
    let path = media_dir.join(relative);
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::warn!("could not remove {}: {e}", path.display());
    }
}
