// mod.rs - CLI module

pub mod args;
pub mod config;
pub mod memory;
pub mod merge;
pub mod validation;

// Re-export main types for convenience
pub use args::Args;
pub use config::Config;
pub use memory::{detect_available_memory, AvailableMemory, MemorySource};
pub use validation::{validate_args, ValidationResult};
