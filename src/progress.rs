//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive an
//! event as each file is handled. The CLI uses this to print the
//! `[OK]`/`[SKIP]`/`[ERROR]` lines above its progress bar; library callers
//! can forward events anywhere without the batch knowing how.
//!
//! # Example
//!
//! ```rust
//! use invoice_shots::{BatchConfig, BatchProgressCallback, FileReport};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, report: &FileReport, _index: usize, _total: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}", report.log_line());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchSummary, FileReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which batch is emitting events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Capture,
    Organize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Capture => f.write_str("capture"),
            Stage::Organize => f.write_str("organize"),
        }
    }
}

/// Called by the batches as they process each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Batches are sequential, but the trait is
/// `Send + Sync` so a config holding it can be shared freely.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, stage: Stage, total_files: usize) {
        let _ = (stage, total_files);
    }

    /// Called before a file is processed. `index` is 1-based.
    fn on_file_start(&self, file_name: &str, index: usize, total: usize) {
        let _ = (file_name, index, total);
    }

    /// Called after a file reaches its outcome.
    fn on_file_complete(&self, report: &FileReport, index: usize, total: usize) {
        let _ = (report, index, total);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, stage: Stage, summary: &BatchSummary) {
        let _ = (stage, summary);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::FileOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        lines: Mutex<Vec<String>>,
        stage_total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, _stage: Stage, total_files: usize) {
            self.stage_total.store(total_files, Ordering::SeqCst);
        }

        fn on_file_start(&self, _file_name: &str, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_complete(&self, report: &FileReport, _index: usize, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.lines.lock().unwrap().push(report.log_line());
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(Stage::Capture, 2);
        cb.on_file_start("a.pdf", 1, 2);
        cb.on_batch_complete(Stage::Capture, &BatchSummary::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(Stage::Organize, 1);
        tracker.on_file_start("a.png", 1, 1);
        tracker.on_file_complete(
            &FileReport {
                file_name: "a.png".into(),
                outcome: FileOutcome::Skipped {
                    reason: "exists".into(),
                },
                duration_ms: 0,
            },
            1,
            1,
        );

        assert_eq!(tracker.stage_total.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.lines.lock().unwrap()[0], "[SKIP] a.png");
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Capture.to_string(), "capture");
        assert_eq!(Stage::Organize.to_string(), "organize");
    }
}
