// traits.rs - Reporter capability passed into every pipeline stage

use indicatif::ProgressBar;

/// Sink for run progress messages.
///
/// Stages never print directly; they receive a reporter so the library can
/// run silently in tests or inside another tool.
pub trait Reporter: Send + Sync {
    /// Informational message
    fn info(&self, message: &str);

    /// Non-fatal problem worth the user's attention
    fn warn(&self, message: &str);

    /// Create a progress bar for `len` units of work
    fn progress_bar(&self, len: u64, label: &str) -> ProgressBar;
}
