//! Progress-callback trait for per-file batch events.
//!
//! Pass an implementation to
//! [`crate::convert::convert_vault_with_progress`] to receive events as the
//! walker works through the vault. The CLI uses this to drive its progress
//! bar without the library knowing anything about terminals. All methods
//! have default no-op bodies so callers only override what they care about.
//!
//! The batch is strictly sequential, so implementations need no
//! synchronisation.

use std::path::Path;

/// Called by the batch orchestrator as it processes each file.
pub trait BatchProgress {
    /// Called once, after the vault walk, before any file is converted.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called when a document converted successfully.
    fn on_file_converted(&self, source: &Path, index: usize, total_files: usize) {
        let _ = (source, index, total_files);
    }

    /// Called when a document failed; the batch continues regardless.
    fn on_file_failed(&self, source: &Path, index: usize, total_files: usize, error: &str) {
        let _ = (source, index, total_files, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl BatchProgress for NoopProgress {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl BatchProgress for Recorder {
        fn on_batch_start(&self, total: usize) {
            self.events.borrow_mut().push(format!("start:{total}"));
        }
        fn on_file_converted(&self, source: &Path, index: usize, total: usize) {
            self.events
                .borrow_mut()
                .push(format!("ok:{}:{index}/{total}", source.display()));
        }
        fn on_file_failed(&self, source: &Path, _index: usize, _total: usize, error: &str) {
            self.events
                .borrow_mut()
                .push(format!("err:{}:{error}", source.display()));
        }
        fn on_batch_complete(&self, total: usize, converted: usize) {
            self.events
                .borrow_mut()
                .push(format!("done:{converted}/{total}"));
        }
    }

    #[test]
    fn noop_does_not_panic() {
        let cb = NoopProgress;
        cb.on_batch_start(3);
        cb.on_file_converted(Path::new("a.md"), 1, 3);
        cb.on_file_failed(Path::new("b.md"), 2, 3, "boom");
        cb.on_batch_complete(3, 2);
    }

    #[test]
    fn recorder_sees_all_events() {
        let r = Recorder::default();
        r.on_batch_start(2);
        r.on_file_converted(Path::new("a.md"), 1, 2);
        r.on_file_failed(Path::new("b.md"), 2, 2, "bad yaml");
        r.on_batch_complete(2, 1);
        let events = r.events.borrow();
        assert_eq!(events.len(), 4);
        assert!(events[0].starts_with("start:2"));
        assert!(events[3].contains("1/2"));
    }
}
