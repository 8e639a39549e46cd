// File pipeline: checks local document files and turns the good ones into
// base64 image payloads for a submission.

use crate::error::{MintError, Result};
use crate::models::{ImagePayload, MimeType};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Largest file the service accepts (30 MiB).
pub const MAX_FILE_SIZE: u64 = 30 * 1024 * 1024;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".pdf", ".tiff", ".tif"];

/// Outcome of [`validate_files`]: every input path ends up in exactly one
/// of the two lists.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FileValidation {
    pub valid_files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl FileValidation {
    pub fn has_valid_files(&self) -> bool {
        !self.valid_files.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Check each path in turn: it exists, it is a regular file, its extension
/// is supported and it is no larger than [`MAX_FILE_SIZE`]. The first failed
/// check is recorded for that path and the rest are skipped.
pub fn validate_files<P: AsRef<Path>>(paths: &[P]) -> FileValidation {
    let mut result = FileValidation::default();

    for path in paths {
        let path = path.as_ref();
        let shown = path.display();

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(_) => {
                result.errors.push(format!("file does not exist: {}", shown));
                continue;
            }
        };

        if !meta.is_file() {
            result.errors.push(format!("not a file: {}", shown));
            continue;
        }

        let ext = extension_of(path);
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            result
                .errors
                .push(format!("unsupported file type: {} ({})", shown, ext));
            continue;
        }

        if meta.len() > MAX_FILE_SIZE {
            let size_mb = meta.len() as f64 / (1024.0 * 1024.0);
            result.errors.push(format!(
                "file too large: {} ({:.2}MB, maximum 30MB)",
                shown, size_mb
            ));
            continue;
        }

        result.valid_files.push(path.to_path_buf());
    }

    result
}

/// Read a file and wrap it as an [`ImagePayload`]. The file name defaults to
/// the base name of `path`.
pub fn encode_file(path: &Path, file_name: Option<&str>) -> Result<ImagePayload> {
    let ext = extension_of(path);
    let mime_type = MimeType::from_extension(&ext)
        .ok_or_else(|| MintError::validation(format!("unsupported file type: {}", ext)))?;

    let bytes = fs::read(path).map_err(|e| {
        MintError::validation(format!("cannot read file {}: {}", path.display(), e))
    })?;

    let file_name = match file_name {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(ImagePayload {
        content: STANDARD.encode(bytes),
        file_name,
        mime_type,
    })
}

/// Encode every path, skipping (and logging) the ones that fail. Only an
/// empty result is an error.
pub fn process_multiple_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImagePayload>> {
    let mut images = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        match encode_file(path, None) {
            Ok(image) => {
                debug!(path = %path.display(), "added image");
                images.push(image);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
        }
    }

    if images.is_empty() {
        return Err(MintError::validation("no valid images to process"));
    }
    Ok(images)
}
