// memory.rs - Non-printing reporters

use super::traits::Reporter;
use indicatif::ProgressBar;
use std::sync::Mutex;

/// Discards every message
#[derive(Debug, Clone, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn info(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}

    fn progress_bar(&self, len: u64, _label: &str) -> ProgressBar {
        let pb = ProgressBar::hidden();
        pb.set_length(len);
        pb
    }
}

/// Keeps every message in memory, warnings prefixed with `WARN: `
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages recorded so far
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }

    fn push(&self, message: String) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.push(format!("WARN: {}", message));
    }

    fn progress_bar(&self, len: u64, _label: &str) -> ProgressBar {
        let pb = ProgressBar::hidden();
        pb.set_length(len);
        pb
    }
}
