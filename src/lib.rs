// lib.rs - polycore library root

//! # polycore - Core genome and ploidy-aware distances for aligned polyploid sequences
//!
//! Takes a reference and samples aligned to it (IUPAC characters, `N` and `-`
//! for missing data), keeps the sites called in enough samples, finds the
//! variant sites among them and computes pairwise allele-copy distances.
//!
//! ## Features
//!
//! - **Ploidy-aware**: ambiguity codes are allele sets; distances count
//!   unshared allele copies per site
//! - **Soft core**: global or progressive core-site selection
//! - **Identity collapse**: identical sequences are computed once and
//!   expanded back in the outputs
//! - **Bounded memory**: sites are streamed through the distance engine in chunks
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use polycore::prelude::*;
//! use polycore::reporter::ConsoleReporter;
//!
//! let reporter = ConsoleReporter;
//! let set = load_sequences(&["ref.fasta", "s1.fasta", "s2.fasta"], &reporter)?;
//! let params = PipelineParams::default();
//! let result = run_pipeline(&set.sequences, &set.names, &params, &reporter)?;
//! println!("{} core sites, {} variants", result.sites.core, result.sites.variants);
//! # Ok::<(), polycore::PolyCoreError>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;
pub mod reporter;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{calculate_distances, collapse_sequences, find_const, find_core};
    pub use crate::core::{run_pipeline, PipelineParams, PipelineResult};
    pub use crate::core::{AlleleCodec, DistanceMatrix, ExpansionPolicy, MatchTable};
    pub use crate::data::{load_sequences, SampleMatrix, SequenceSet};
    pub use crate::error::PolyCoreError;
    pub use crate::output::write_outputs;
    pub use crate::reporter::Reporter;
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use crate::core::{AlleleCodec, DistanceMatrix, ExpansionPolicy, PipelineParams, PipelineResult};
pub use data::{SampleMatrix, SequenceSet};
pub use error::PolyCoreError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "polycore v{} - Core genome and ploidy-aware distances for polyploid alignments",
        VERSION
    )
}
