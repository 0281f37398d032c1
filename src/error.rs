//! Error types for the img-rename library.
//!
//! Three error types map to three failure boundaries:
//!
//! * [`RenameError`] is **fatal**: the run cannot start at all (directory
//!   missing, no API key, invalid configuration). Returned as
//!   `Err(RenameError)` from the top-level `rename_*` functions.
//!
//! * [`FileError`] is **non-fatal**: a single image failed (upload error, no
//!   usable suggestion, rename refused) while the rest of the directory is
//!   fine. Stored inside [`crate::output::FileOutcome`] and the scan moves on
//!   to the next file.
//!
//! * [`ServiceError`] is what a [`crate::service::VisionService`] returns.
//!   The driver wraps it into the matching [`FileError`] variant together
//!   with the filename.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the img-rename library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RenameError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The directory to scan does not exist.
    #[error("Directory not found: '{path}'\nCheck the path exists and is readable.")]
    DirectoryNotFound { path: PathBuf },

    /// The path exists but is a regular file.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// Listing the directory failed (permissions, I/O).
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// The vision provider cannot be built (missing API key etc.).
    #[error("Vision provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
///
/// Every message names the file so a log line alone identifies the culprit.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// The image could not be read from disk.
    #[error("{file}: failed to read image: {detail}")]
    ReadFailed { file: String, detail: String },

    /// The remote upload failed.
    #[error("{file}: upload failed: {detail}")]
    UploadFailed { file: String, detail: String },

    /// The model call failed.
    #[error("{file}: inference failed: {detail}")]
    InferenceFailed { file: String, detail: String },

    /// The response held no usable filename line.
    #[error("{file}: no valid suggestion received")]
    NoSuggestion { file: String },

    /// A different file already has the suggested name.
    #[error("{file}: target '{target}' already exists")]
    TargetExists { file: String, target: String },

    /// The filesystem rename failed; the original file is untouched.
    #[error("{file}: rename to '{target}' failed: {detail}")]
    RenameFailed {
        file: String,
        target: String,
        detail: String,
    },
}

impl FileError {
    /// The original filename this error refers to.
    pub fn file(&self) -> &str {
        match self {
            FileError::ReadFailed { file, .. }
            | FileError::UploadFailed { file, .. }
            | FileError::InferenceFailed { file, .. }
            | FileError::NoSuggestion { file }
            | FileError::TargetExists { file, .. }
            | FileError::RenameFailed { file, .. } => file,
        }
    }
}

/// Errors raised at the remote service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection, TLS or body-transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The API rejected the credential (401/403).
    #[error("authentication rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The API answered 2xx but the payload was not what we expected.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Local I/O while preparing a request.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::MalformedResponse(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}
