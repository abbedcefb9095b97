// console.rs - Terminal reporter with timestamps and progress bars

use super::traits::Reporter;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints timestamped messages to stdout, warnings to stderr
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{} - {}", Self::timestamp(), message);
    }

    fn warn(&self, message: &str) {
        eprintln!("{} - ⚠️  {}", Self::timestamp(), message);
    }

    fn progress_bar(&self, len: u64, label: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{percent}}%) ETA: {{eta}}",
            label
        );
        match ProgressStyle::default_bar().template(&template) {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(_) => pb.set_style(ProgressStyle::default_bar()),
        }
        pb
    }
}
