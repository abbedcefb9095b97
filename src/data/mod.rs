// mod.rs - Data structures module

pub mod matrix;
pub mod sequences;

// Re-export main types for convenience
pub use matrix::{SampleMatrix, SiteMatrix, MISSING_BASE};
pub use sequences::{load_sequences, LoadedSequence, SequenceSet, REFERENCE_NAME};
