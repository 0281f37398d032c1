//! Configuration types for a rename run.
//!
//! All behaviour is controlled through [`RenameConfig`], built via its
//! [`RenameConfigBuilder`]. The directory and the API key used to be a
//! hardcoded path and an ambient variable; both are plain fields here so the
//! entry point receives everything explicitly.

use crate::error::RenameError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Gemini model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for renaming every image in one directory.
///
/// # Example
/// ```rust
/// use img_rename::RenameConfig;
///
/// let config = RenameConfig::builder()
///     .directory("/tmp/photos")
///     .model("gemini-2.0-flash")
///     .dry_run(true)
///     .build()
///     .unwrap();
/// assert!(config.dry_run);
/// ```
#[derive(Clone)]
pub struct RenameConfig {
    /// Directory whose images are renamed in place.
    pub directory: PathBuf,

    /// Gemini API key. If None, read from `GEMINI_API_KEY` when the client is built.
    pub api_key: Option<String>,

    /// Model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// API base URL. Tests point this at a mock server.
    pub base_url: String,

    /// Sampling parameters for every generate call.
    pub generation: GenerationSettings,

    /// Custom system instruction. If None, uses the built-in default.
    pub system_instruction: Option<String>,

    /// Custom user-turn instruction. If None, uses the built-in default.
    pub instruction: Option<String>,

    /// Query the model but leave the filesystem untouched. Default: false.
    pub dry_run: bool,

    /// Progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationSettings::default(),
            system_instruction: None,
            instruction: None,
            dry_run: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameConfig")
            .field("directory", &self.directory)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .field("system_instruction", &self.system_instruction)
            .field("instruction", &self.instruction)
            .field("dry_run", &self.dry_run)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RenameProgressCallback>"),
            )
            .finish()
    }
}

impl RenameConfig {
    /// Create a new builder for `RenameConfig`.
    pub fn builder() -> RenameConfigBuilder {
        RenameConfigBuilder {
            config: Self::default(),
        }
    }

    /// The system instruction in effect (override or default).
    pub fn effective_system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_SYSTEM_INSTRUCTION)
    }

    /// The user-turn instruction in effect (override or default).
    pub fn effective_instruction(&self) -> &str {
        self.instruction
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_INSTRUCTION)
    }
}

/// Builder for [`RenameConfig`].
#[derive(Debug)]
pub struct RenameConfigBuilder {
    config: RenameConfig,
}

impl RenameConfigBuilder {
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.directory = dir.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.generation.temperature = t;
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.generation.top_p = p;
        self
    }

    pub fn top_k(mut self, k: u32) -> Self {
        self.config.generation.top_k = k;
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.generation.max_output_tokens = n;
        self
    }

    pub fn system_instruction(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_instruction = Some(prompt.into());
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenameConfig, RenameError> {
        let c = &self.config;
        if c.directory.as_os_str().is_empty() {
            return Err(RenameError::InvalidConfig(
                "Directory must not be empty".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(RenameError::InvalidConfig("Model must not be empty".into()));
        }
        c.generation.validate()?;
        Ok(self.config)
    }
}

/// Sampling parameters sent with every generate request.
///
/// The defaults favour a short, focused answer: a single filename line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Default: 0.7.
    pub temperature: f32,
    /// Nucleus sampling mass. Default: 0.95.
    pub top_p: f32,
    /// Default: 40.
    pub top_k: u32,
    /// Default: 8192.
    pub max_output_tokens: u32,
    /// Default: `text/plain`.
    pub response_mime_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

impl GenerationSettings {
    fn validate(&self) -> Result<(), RenameError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RenameError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(RenameError::InvalidConfig(format!(
                "top_p must be 0.0–1.0, got {}",
                self.top_p
            )));
        }
        if self.top_k == 0 {
            return Err(RenameError::InvalidConfig("top_k must be ≥ 1".into()));
        }
        if self.max_output_tokens == 0 {
            return Err(RenameError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(())
    }
}
