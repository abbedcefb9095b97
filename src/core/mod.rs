// mod.rs - Core analysis stages

pub mod codec;
pub mod collapse;
pub mod core_sites;
pub mod distance;
pub mod match_table;
pub mod pipeline;
pub mod qc;
pub mod variants;

// Re-export main types for convenience
pub use codec::{check_alphabet, infer_ploidy, resolve_ploidy, AlleleCodec, MaskMatrix};
pub use collapse::{collapse_sequences, CollapseGroups, Collapsed, ExpansionPolicy};
pub use core_sites::{find_core, CoreSelection, ProgressionStep};
pub use distance::{auto_chunk_size, calculate_distances, DistanceMatrix, PairIndex};
pub use match_table::{build_match_table, MatchTable};
pub use pipeline::{run_pipeline, PipelineParams, PipelineResult, SampleSummary};
pub use qc::{filter_sequences, QcResult};
pub use variants::{find_const, ConstantSites, VariantFilter, VariantSites};
