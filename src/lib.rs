//! # img-rename
//!
//! Rename image files using names suggested by a Vision Language Model.
//!
//! Camera and screenshot names (`IMG_0042.JPG`, `Screenshot 2024-…png`) say
//! nothing about what is in the picture. This crate uploads each image to
//! Google Gemini, asks for a short hyphenated description, and renames the
//! file to match: `IMG_0042.JPG` → `golden-retriever-puppy.jpg`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Scan       keep .png / .jpg / .jpeg / .webp (any case)
//!  ├─ 2. MIME       extension → image/png, image/jpeg, image/webp
//!  ├─ 3. Upload     Gemini Files API → file URI
//!  ├─ 4. Ask        one stateless generateContent call per image
//!  ├─ 5. Extract    first non-preamble line, decoration stripped
//!  └─ 6. Rename     lowercase, hyphens, original extension, in place
//! ```
//!
//! Files are handled one at a time. A failure on one image is logged and
//! recorded in the report; the scan always continues.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img_rename::{rename_directory, RenameConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY
//!     let config = RenameConfig::builder().directory("photos").build()?;
//!     let report = rename_directory(&config).await?;
//!     eprintln!("{}/{} renamed", report.stats.renamed_files, report.stats.total_files);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img-rename` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rename;
pub mod service;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationSettings, RenameConfig, RenameConfigBuilder};
pub use error::{FileError, RenameError, ServiceError};
pub use output::{FileOutcome, RenameReport, RenameStats};
pub use progress::{NoopProgressCallback, ProgressCallback, RenameProgressCallback};
pub use rename::{rename_directory, rename_directory_sync, rename_directory_with, rename_file};
pub use service::{GeminiClient, GenerateRequest, UploadedFile, VisionService};
pub use stream::{rename_stream, OutcomeStream};
