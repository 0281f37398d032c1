//! VLM interaction: upload one image and ask the model for a filename.
//!
//! This stage is intentionally thin. Prompts live in [`crate::prompts`],
//! parsing lives in [`crate::pipeline::extract`]. There is no retry: the first
//! failure is reported as a [`FileError`] and the driver moves on.
//!
//! ## Message Layout
//!
//! Each image gets a fresh, stateless request:
//! 1. **System instruction**: the filename-only prompt (or the override)
//! 2. **User turn**: the instruction text followed by the uploaded file handle

use crate::config::RenameConfig;
use crate::error::FileError;
use crate::service::{GenerateRequest, VisionService};
use std::path::Path;
use tracing::debug;

/// Upload `path` and return the model's raw text response.
///
/// `file` is the display name used in error messages.
pub async fn request_suggestion(
    service: &dyn VisionService,
    path: &Path,
    file: &str,
    mime_type: &str,
    config: &RenameConfig,
) -> Result<String, FileError> {
    let uploaded = service
        .upload(path, mime_type)
        .await
        .map_err(|e| FileError::UploadFailed {
            file: file.to_string(),
            detail: e.to_string(),
        })?;

    let request = GenerateRequest {
        system_instruction: config.effective_system_instruction(),
        instruction: config.effective_instruction(),
        settings: &config.generation,
    };

    let text = service
        .generate(&uploaded, request)
        .await
        .map_err(|e| FileError::InferenceFailed {
            file: file.to_string(),
            detail: e.to_string(),
        })?;

    debug!("{}: model response {:?}", file, text);
    Ok(text)
}
