//! Progress-callback trait for per-file rename events.
//!
//! Inject an [`Arc<dyn RenameProgressCallback>`] via
//! [`crate::config::RenameConfigBuilder::progress_callback`] to receive
//! events as the driver works through the directory. Callers can forward them
//! to a terminal progress bar, a channel, or a log file without the library
//! knowing how the host communicates.
//!
//! # Example
//!
//! ```rust
//! use img_rename::{RenameConfig, RenameProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     renamed: AtomicUsize,
//! }
//!
//! impl RenameProgressCallback for CountingCallback {
//!     fn on_file_renamed(&self, _index: usize, _total: usize, from: &str, to: &str) {
//!         self.renamed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{from} -> {to}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { renamed: AtomicUsize::new(0) });
//!
//! let config = RenameConfig::builder()
//!     .progress_callback(counter as Arc<dyn RenameProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the rename driver as it processes each file.
///
/// Files are processed one at a time, but implementations must still be
/// `Send + Sync` so the callback can live inside a spawned task. All methods
/// have default no-op implementations.
pub trait RenameProgressCallback: Send + Sync {
    /// Called once after the directory scan.
    ///
    /// # Arguments
    /// * `total_files`: number of supported images found
    fn on_scan_complete(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before the file is uploaded.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the scan
    /// * `total`: total images in the scan
    /// * `file`: original filename
    fn on_file_start(&self, index: usize, total: usize, file: &str) {
        let _ = (index, total, file);
    }

    /// Called after a successful rename (or a dry-run match).
    fn on_file_renamed(&self, index: usize, total: usize, from: &str, to: &str) {
        let _ = (index, total, from, to);
    }

    /// Called when the file could not be renamed.
    ///
    /// `error` is owned so implementations can move it into a spawned task.
    fn on_file_error(&self, index: usize, total: usize, file: &str, error: String) {
        let _ = (index, total, file, error);
    }

    /// Called once after every file has been attempted.
    fn on_run_complete(&self, total_files: usize, renamed_count: usize) {
        let _ = (total_files, renamed_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenameProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenameConfig`].
pub type ProgressCallback = Arc<dyn RenameProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        renames: Mutex<Vec<(String, String)>>,
        errors: Mutex<Vec<String>>,
        scanned: AtomicUsize,
    }

    impl RenameProgressCallback for TrackingCallback {
        fn on_scan_complete(&self, total_files: usize) {
            self.scanned.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _file: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_renamed(&self, _index: usize, _total: usize, from: &str, to: &str) {
            self.renames
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string()));
        }

        fn on_file_error(&self, _index: usize, _total: usize, _file: &str, error: String) {
            self.errors.lock().unwrap().push(error);
        }
    }

    #[test]
    fn test_noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_complete(2);
        cb.on_file_start(1, 2, "a.png");
        cb.on_file_renamed(1, 2, "a.png", "b.png");
        cb.on_file_error(2, 2, "c.jpg", "boom".into());
        cb.on_run_complete(2, 1);
    }

    #[test]
    fn test_tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_scan_complete(2);
        tracker.on_file_start(1, 2, "a.png");
        tracker.on_file_renamed(1, 2, "a.png", "cat.png");
        tracker.on_file_start(2, 2, "b.png");
        tracker.on_file_error(2, 2, "b.png", "upload failed".into());

        assert_eq!(tracker.scanned.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(
            tracker.renames.lock().unwrap().as_slice(),
            &[("a.png".to_string(), "cat.png".to_string())]
        );
        assert_eq!(tracker.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_arc_dyn_callback_moves_into_spawned_task() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        tokio::spawn(async move {
            cb.on_file_error(1, 1, "x.png", "timeout".to_string());
        })
        .await
        .expect("spawn must succeed");
    }
}
