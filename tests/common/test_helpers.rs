/// Common test helper functions

use super::recording::{CountingStore, RecordingNotifier, RecordingSink};
use faultline::error::{ErrorHandler, RetryPolicy, Sleeper};
use faultline::io::{FileOps, OpenMode, StdFileOps};
use faultline::{HandlerConfig, SafeFileIo};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Handler wired to recording collaborators
pub struct Harness {
    pub handler: Arc<ErrorHandler>,
    pub notifier: Arc<RecordingNotifier>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<CountingStore>,
}

pub fn harness(max_history: usize) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let sink = Arc::new(RecordingSink::default());
    let store = Arc::new(CountingStore::new("conversations"));

    let config = HandlerConfig {
        max_history,
        ..HandlerConfig::default()
    };
    let handler = ErrorHandler::new(&config)
        .with_notifier(notifier.clone())
        .with_log_sink(sink.clone())
        .with_state_store(store.clone());

    Harness {
        handler: Arc::new(handler),
        notifier,
        sink,
        store,
    }
}

/// Records requested delays without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Real filesystem, but the first `failures` opens and removes fail with `kind`
pub struct LockedOps {
    remaining: AtomicU32,
    kind: io::ErrorKind,
    pub calls: AtomicU32,
}

impl LockedOps {
    pub fn new(failures: u32, kind: io::ErrorKind) -> Self {
        Self {
            remaining: AtomicU32::new(failures),
            kind,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn maybe_fail(&self) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.remaining.load(Ordering::SeqCst);
        if left > 0 {
            self.remaining.store(left - 1, Ordering::SeqCst);
            return Err(io::Error::new(self.kind, "file is locked by another process"));
        }
        Ok(())
    }
}

impl FileOps for LockedOps {
    fn open(&self, path: &Path, mode: OpenMode) -> io::Result<File> {
        self.maybe_fail()?;
        StdFileOps.open(path, mode)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.maybe_fail()?;
        StdFileOps.remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        StdFileOps.exists(path)
    }

    fn platform_name(&self) -> &str {
        "Locked"
    }
}

/// SafeFileIo over `ops` with the default policy and a recording sleeper
pub fn safe_io_with(ops: Arc<LockedOps>) -> (SafeFileIo, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let safe = SafeFileIo::new(RetryPolicy::default())
        .with_file_ops(ops)
        .with_sleeper(sleeper.clone());
    (safe, sleeper)
}
