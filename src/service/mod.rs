//! Remote vision service boundary.
//!
//! The driver only ever needs two calls: store an image remotely and ask the
//! model about it. [`VisionService`] captures exactly that, so the Gemini
//! client in [`gemini`] can be swapped for a test double that returns canned
//! text.

pub mod gemini;

use crate::config::GenerationSettings;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use gemini::GeminiClient;

/// Opaque handle to a file stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Service-side resource name, e.g. `files/abc-123`.
    pub name: String,
    pub display_name: String,
    /// URI the model request refers to.
    pub uri: String,
    pub mime_type: String,
}

/// Everything a single generate call needs besides the uploaded file.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub system_instruction: &'a str,
    /// User-turn text sent before the image.
    pub instruction: &'a str,
    pub settings: &'a GenerationSettings,
}

/// A remote vision-language model that accepts uploaded files.
///
/// Each `generate` call is a fresh, stateless exchange: nothing carries over
/// from one image to the next.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Upload the file at `path` with the given MIME type.
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<UploadedFile, ServiceError>;

    /// Ask the model about `file` and return its text response.
    async fn generate(
        &self,
        file: &UploadedFile,
        request: GenerateRequest<'_>,
    ) -> Result<String, ServiceError>;
}
