//! Eager (whole-directory) rename entry points.
//!
//! Files are processed strictly one after another: upload, ask, rename, then
//! the next file. A failure on one file is recorded in its [`FileOutcome`]
//! and never stops the scan. Use [`crate::stream::rename_stream`] to receive
//! outcomes as each file finishes instead of waiting for the report.

use crate::config::RenameConfig;
use crate::error::{FileError, RenameError};
use crate::output::{FileOutcome, RenameReport, RenameStats};
use crate::pipeline::{extract, llm, mime, normalize, scan};
use crate::service::{GeminiClient, VisionService};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Rename every supported image in `config.directory` using Gemini.
///
/// The API key comes from `config.api_key` or `GEMINI_API_KEY`.
///
/// # Errors
/// Returns `Err(RenameError)` only for fatal errors:
/// - Directory missing, not a directory, or unreadable
/// - No API key available
///
/// Per-file failures are reported in the returned [`RenameReport`].
pub async fn rename_directory(config: &RenameConfig) -> Result<RenameReport, RenameError> {
    let service = GeminiClient::from_config(config)?;
    rename_directory_with(&service, config).await
}

/// Same as [`rename_directory`] with a caller-supplied [`VisionService`].
pub async fn rename_directory_with(
    service: &dyn VisionService,
    config: &RenameConfig,
) -> Result<RenameReport, RenameError> {
    let run_start = Instant::now();
    info!("Scanning {}", config.directory.display());

    let images = scan::scan_directory(&config.directory)?;
    let total = images.len();
    info!("Found {} images", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(total);
    }

    let mut claims = NameClaims::default();
    let mut files = Vec::with_capacity(total);
    for (i, path) in images.iter().enumerate() {
        files.push(run_file(service, path, i + 1, total, config, &mut claims).await);
    }

    let renamed = files.iter().filter(|f| f.is_renamed()).count();
    let stats = RenameStats {
        total_files: total,
        renamed_files: renamed,
        failed_files: total - renamed,
        total_duration_ms: run_start.elapsed().as_millis() as u64,
    };
    info!(
        "Run complete: {}/{} renamed, {}ms total",
        renamed, total, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, renamed);
    }

    Ok(RenameReport {
        files,
        stats,
        dry_run: config.dry_run,
    })
}

/// Blocking wrapper around [`rename_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn rename_directory_sync(config: &RenameConfig) -> Result<RenameReport, RenameError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenameError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(rename_directory(config))
}

/// Names taken and freed by earlier files of the same run.
///
/// A dry run never touches the disk, so collisions between files of one run
/// are only visible here.
#[derive(Debug, Default)]
pub(crate) struct NameClaims {
    claimed: HashSet<String>,
    vacated: HashSet<String>,
}

impl NameClaims {
    fn record(&mut self, from: &str, to: &str) {
        if from != to {
            self.vacated.insert(from.to_string());
            self.claimed.remove(from);
        }
        self.vacated.remove(to);
        self.claimed.insert(to.to_string());
    }
}

/// Process a single image: upload, ask, extract, normalise, rename.
///
/// Never fails; errors are logged and stored in the outcome.
pub async fn rename_file(
    service: &dyn VisionService,
    path: &Path,
    config: &RenameConfig,
) -> FileOutcome {
    rename_file_claiming(service, path, config, &mut NameClaims::default()).await
}

async fn rename_file_claiming(
    service: &dyn VisionService,
    path: &Path,
    config: &RenameConfig,
    claims: &mut NameClaims,
) -> FileOutcome {
    let started = Instant::now();
    let file = display_name(path);

    let result = attempt(service, path, &file, config, claims).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(new_name) => {
            if config.dry_run {
                info!("Would rename: {} -> {}", file, new_name);
            } else {
                info!("Renamed: {} -> {}", file, new_name);
            }
            FileOutcome {
                original: file,
                new_name: Some(new_name),
                error: None,
                duration_ms,
            }
        }
        Err(e) => {
            if matches!(e, FileError::NoSuggestion { .. }) {
                warn!("Could not process {}", e);
            } else {
                warn!("Error processing {}", e);
            }
            FileOutcome {
                original: file,
                new_name: None,
                error: Some(e),
                duration_ms,
            }
        }
    }
}

/// [`rename_file`] plus progress events, for the driver loops.
pub(crate) async fn run_file(
    service: &dyn VisionService,
    path: &Path,
    index: usize,
    total: usize,
    config: &RenameConfig,
    claims: &mut NameClaims,
) -> FileOutcome {
    let file = display_name(path);
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(index, total, &file);
    }

    let outcome = rename_file_claiming(service, path, config, claims).await;

    if let Some(ref cb) = config.progress_callback {
        match (&outcome.new_name, &outcome.error) {
            (_, Some(e)) => cb.on_file_error(index, total, &file, e.to_string()),
            (Some(to), None) => cb.on_file_renamed(index, total, &file, to),
            (None, None) => {}
        }
    }
    outcome
}

async fn attempt(
    service: &dyn VisionService,
    path: &Path,
    file: &str,
    config: &RenameConfig,
    claims: &mut NameClaims,
) -> Result<String, FileError> {
    tokio::fs::metadata(path)
        .await
        .map_err(|e| FileError::ReadFailed {
            file: file.to_string(),
            detail: e.to_string(),
        })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mime_type = mime::mime_for_extension(ext);

    let response = llm::request_suggestion(service, path, file, mime_type, config).await?;
    let suggestion =
        extract::extract_filename(&response).ok_or_else(|| FileError::NoSuggestion {
            file: file.to_string(),
        })?;
    let new_name = normalize::normalize_filename(&suggestion, ext);

    if new_name == file {
        claims.record(file, &new_name);
        return Ok(new_name);
    }

    let target = path.with_file_name(&new_name);
    let taken = claims.claimed.contains(&new_name)
        || occupied_by_other(path, &target, &new_name, claims).await;
    if taken {
        return Err(FileError::TargetExists {
            file: file.to_string(),
            target: new_name,
        });
    }

    if !config.dry_run {
        tokio::fs::rename(path, &target)
            .await
            .map_err(|e| FileError::RenameFailed {
                file: file.to_string(),
                target: new_name.clone(),
                detail: e.to_string(),
            })?;
    }
    claims.record(file, &new_name);
    Ok(new_name)
}

/// Whether `target` is a different file that a rename of `path` would replace.
///
/// A case-only rename on a case-insensitive filesystem resolves `target` to
/// `path` itself, which is not a collision.
async fn occupied_by_other(path: &Path, target: &Path, name: &str, claims: &NameClaims) -> bool {
    if claims.vacated.contains(name) {
        return false;
    }
    match tokio::fs::try_exists(target).await {
        Ok(true) => !same_file(path, target).await,
        Ok(false) => false,
        // Unknown counts as taken.
        Err(_) => true,
    }
}

#[cfg(unix)]
async fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (tokio::fs::metadata(a).await, tokio::fs::metadata(b).await) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::service::{GenerateRequest, UploadedFile};
    use async_trait::async_trait;

    struct Canned(&'static str);

    #[async_trait]
    impl VisionService for Canned {
        async fn upload(&self, path: &Path, mime_type: &str) -> Result<UploadedFile, ServiceError> {
            Ok(UploadedFile {
                name: "files/1".into(),
                display_name: display_name(path),
                uri: "mem://1".into(),
                mime_type: mime_type.into(),
            })
        }

        async fn generate(
            &self,
            _file: &UploadedFile,
            _request: GenerateRequest<'_>,
        ) -> Result<String, ServiceError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_same_name_is_a_no_op_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"x").unwrap();

        let outcome = rename_file(&Canned("cat"), &path, &RenameConfig::default()).await;
        assert_eq!(outcome.new_name.as_deref(), Some("cat.png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_existing_target_is_not_clobbered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"original").unwrap();
        std::fs::write(dir.path().join("dog.jpg"), b"other").unwrap();

        let outcome = rename_file(&Canned("dog"), &path, &RenameConfig::default()).await;
        assert!(matches!(outcome.error, Some(FileError::TargetExists { .. })));
        assert!(path.exists());
        assert_eq!(std::fs::read(dir.path().join("dog.jpg")).unwrap(), b"other");
    }

    #[tokio::test]
    async fn test_case_only_suggestion_does_not_replace_distinct_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cat.png");
        std::fs::write(&path, b"source").unwrap();
        std::fs::write(dir.path().join("cat.png"), b"precious").unwrap();
        if std::fs::read_dir(dir.path()).unwrap().count() < 2 {
            // Case-insensitive filesystem: both names are one file.
            return;
        }

        let outcome = rename_file(&Canned("cat"), &path, &RenameConfig::default()).await;
        assert!(
            matches!(outcome.error, Some(FileError::TargetExists { .. })),
            "got {outcome:?}"
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"source");
        assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"precious");
    }

    #[tokio::test]
    async fn test_case_only_rename_of_same_file_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cat.png");
        std::fs::write(&path, b"source").unwrap();

        let outcome = rename_file(&Canned("cat"), &path, &RenameConfig::default()).await;
        assert_eq!(outcome.new_name.as_deref(), Some("cat.png"));
        assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"source");
    }

    #[tokio::test]
    async fn test_claims_free_a_vacated_name_in_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();
        let config = RenameConfig::builder()
            .directory(dir.path())
            .dry_run(true)
            .build()
            .unwrap();
        let mut claims = NameClaims::default();

        let first = rename_file_claiming(&Canned("cat"), &a, &config, &mut claims).await;
        assert_eq!(first.new_name.as_deref(), Some("cat.png"));
        // a.png would be gone after a real run, so b.png may take it.
        let second = rename_file_claiming(&Canned("a"), &b, &config, &mut claims).await;
        assert_eq!(second.new_name.as_deref(), Some("a.png"));
        assert!(a.exists() && b.exists());
    }

    #[tokio::test]
    async fn test_vanished_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.png");

        let outcome = rename_file(&Canned("x"), &path, &RenameConfig::default()).await;
        assert!(matches!(outcome.error, Some(FileError::ReadFailed { .. })));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.JPG");
        std::fs::write(&path, b"x").unwrap();
        let config = RenameConfig::builder()
            .directory(dir.path())
            .dry_run(true)
            .build()
            .unwrap();

        let outcome = rename_file(&Canned("Red Car Photo"), &path, &config).await;
        assert_eq!(outcome.new_name.as_deref(), Some("red-car-photo.jpg"));
        assert!(path.exists());
        assert!(!dir.path().join("red-car-photo.jpg").exists());
    }
}
