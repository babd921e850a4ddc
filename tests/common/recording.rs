/// Collaborators that record every call for later inspection

use anyhow::{bail, Result};
use faultline::error::{LogSink, Notifier, StateStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Status(String),
    Alert(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Status(s) => Some(s),
                Notification::Alert(_) => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Alert(s) => Some(s),
                Notification::Status(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn status(&self, message: &str) -> Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push(Notification::Status(message.to_string()));
        Ok(())
    }

    fn alert(&self, message: &str) -> Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push(Notification::Alert(message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, line: &str) -> Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}

/// State store counting saves; optionally failing every save
pub struct CountingStore {
    name: String,
    saves: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            saves: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl StateStore for CountingStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn save(&self) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("{} is read-only", self.name);
        }
        Ok(())
    }
}
