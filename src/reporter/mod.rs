// mod.rs - Reporter module root

pub mod console;
pub mod memory;
pub mod traits;

// Re-export main types for convenience
pub use console::ConsoleReporter;
pub use memory::{MemoryReporter, SilentReporter};
pub use traits::Reporter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_records_messages() {
        let reporter = MemoryReporter::new();
        reporter.info("Loaded 3 sequences");
        reporter.warn("low genome fraction");

        let messages = reporter.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Loaded 3 sequences");
        assert_eq!(messages[1], "WARN: low genome fraction");
        assert!(reporter.contains("genome fraction"));
    }

    #[test]
    fn test_silent_reporter_progress_is_hidden() {
        let reporter = SilentReporter;
        let pb = reporter.progress_bar(10, "sites");
        assert!(pb.is_hidden());
        assert_eq!(pb.length(), Some(10));
    }

    #[test]
    fn test_reporter_as_trait_object() {
        let memory = MemoryReporter::new();
        let reporters: Vec<&dyn Reporter> = vec![&SilentReporter, &memory];
        for reporter in reporters {
            reporter.info("hello");
        }
        assert_eq!(memory.messages(), vec!["hello".to_string()]);
    }
}
