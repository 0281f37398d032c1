//! Streaming rename API: emit each file's outcome as soon as it finishes.
//!
//! Unlike [`crate::rename::rename_directory_with`], which returns only after
//! the whole directory is done, [`rename_stream`] yields one [`FileOutcome`]
//! per image. Files are still processed one at a time, in scan order; the
//! next file starts only when the consumer polls for it.
//!
//! `on_run_complete` is not fired in streaming mode because the library
//! cannot tell when the consumer stops polling.

use crate::config::RenameConfig;
use crate::error::RenameError;
use crate::output::FileOutcome;
use crate::pipeline::scan;
use crate::rename::{run_file, NameClaims};
use crate::service::VisionService;
use futures::stream::{self, Stream};
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

/// A boxed stream of per-file outcomes.
pub type OutcomeStream = Pin<Box<dyn Stream<Item = FileOutcome> + Send>>;

/// Scan the directory and return a lazy stream of rename outcomes.
///
/// # Errors
/// Fatal scan errors (missing or unreadable directory) are returned before
/// any file is touched.
///
/// # Example
/// ```rust,no_run
/// use img_rename::{rename_stream, GeminiClient, RenameConfig, VisionService};
/// use futures::StreamExt;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RenameConfig::builder().directory("photos").build()?;
/// let service: Arc<dyn VisionService> = Arc::new(GeminiClient::from_config(&config)?);
/// let mut outcomes = rename_stream(service, &config)?;
/// while let Some(o) = outcomes.next().await {
///     println!("{} -> {:?}", o.original, o.new_name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn rename_stream(
    service: Arc<dyn VisionService>,
    config: &RenameConfig,
) -> Result<OutcomeStream, RenameError> {
    info!("Starting streaming rename: {}", config.directory.display());

    let images = scan::scan_directory(&config.directory)?;
    let total = images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_scan_complete(total);
    }

    // Claims travel with the stream state so collisions are caught across files.
    let config = config.clone();
    let state = (images.into_iter().enumerate(), NameClaims::default());
    let s = stream::unfold(state, move |(mut images, mut claims)| {
        let service = Arc::clone(&service);
        let cfg = config.clone();
        async move {
            let (i, path) = images.next()?;
            let outcome =
                run_file(service.as_ref(), &path, i + 1, total, &cfg, &mut claims).await;
            Some((outcome, (images, claims)))
        }
    });

    Ok(Box::pin(s))
}
