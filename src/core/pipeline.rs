// pipeline.rs - End-to-end run: collapse, QC, core, variants, distances, expansion

use super::codec::{check_alphabet, resolve_ploidy, AlleleCodec};
use super::collapse::{collapse_sequences, CollapseGroups, ExpandedDistances, ExpansionPolicy};
use super::core_sites::find_core;
use super::distance::calculate_distances;
use super::qc::filter_sequences;
use super::variants::{find_const, ConstantSites, VariantFilter};
use crate::data::matrix::SampleMatrix;
use crate::error::{PolyCoreError, Result};
use crate::reporter::Reporter;
use serde::Serialize;
use std::time::Instant;

/// Default number of sites per distance chunk when none is derived from memory
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Thresholds and engine settings for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineParams {
    pub min_gf: f64,
    pub min_cf: f64,
    pub min_pf: f64,
    pub min_pn: usize,
    pub progressive: bool,
    /// `None` infers the ploidy from the data
    pub ploidy: Option<usize>,
    pub chunk_size: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            min_gf: 0.9,
            min_cf: 0.95,
            min_pf: 0.0,
            min_pn: 0,
            progressive: false,
            ploidy: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PipelineParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min-gf", self.min_gf),
            ("min-cf", self.min_cf),
            ("min-pf", self.min_pf),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolyCoreError::InvalidThreshold { name, value });
            }
        }
        if self.ploidy == Some(0) {
            return Err(PolyCoreError::InvalidPloidy(0));
        }
        if self.chunk_size == 0 {
            return Err(PolyCoreError::InvalidChunkSize(0));
        }
        Ok(())
    }

    pub fn variant_filter(&self) -> VariantFilter {
        VariantFilter {
            min_pf: self.min_pf,
            min_pn: self.min_pn,
        }
    }
}

/// Per-sample line of the run summary
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub name: String,
    /// Sites left after reference validation
    pub length: usize,
    pub missing: usize,
    pub genome_fraction: f64,
    /// `None` when the sample was removed by QC
    pub core_fraction: Option<f64>,
    /// Distance to the reference over variant sites, `None` when filtered
    pub variants: Option<u64>,
}

/// Named sequences over original samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedAlignment {
    pub names: Vec<String>,
    pub sequences: Vec<String>,
}

impl NamedAlignment {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of columns (0 for an empty alignment)
    pub fn width(&self) -> usize {
        self.sequences.first().map(|s| s.len()).unwrap_or(0)
    }
}

/// Distance matrix with sample names attached
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedDistances {
    pub names: Vec<String>,
    /// `None` where either sample was removed by QC
    pub values: Vec<Vec<Option<u64>>>,
}

impl NamedDistances {
    fn from_expanded(expanded: ExpandedDistances, original_names: &[String]) -> Self {
        Self {
            names: expanded.names(original_names),
            values: expanded.values,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Site bookkeeping through the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SiteCounts {
    pub input: usize,
    pub removed_reference: usize,
    pub validated: usize,
    pub core: usize,
    pub variants: usize,
    pub unfiltered_variants: usize,
}

/// Everything a run produces, expanded back to original samples
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub ploidy: usize,
    pub names: Vec<String>,
    pub groups: CollapseGroups,
    /// Kept flag per representative
    pub kept: Vec<bool>,
    pub sites: SiteCounts,
    /// Core flag per validated site
    pub core_mask: Vec<bool>,
    pub core_fraction: f64,
    /// `(representative name, core fraction)` in addition order
    pub progression: Vec<(String, f64)>,
    pub constant: ConstantSites,
    pub core_alignment: NamedAlignment,
    pub variant_alignment: NamedAlignment,
    pub distances_core: NamedDistances,
    pub distances_full: NamedDistances,
    pub summary: Vec<SampleSummary>,
}

impl PipelineResult {
    pub fn n_samples(&self) -> usize {
        self.names.len()
    }

    pub fn n_representatives(&self) -> usize {
        self.groups.n_representatives()
    }

    pub fn n_kept_representatives(&self) -> usize {
        self.kept.iter().filter(|&&k| k).count()
    }
}

fn check_inputs(sequences: &[Vec<u8>], names: &[String]) -> Result<()> {
    if names.len() != sequences.len() {
        return Err(PolyCoreError::NameCountMismatch {
            names: names.len(),
            sequences: sequences.len(),
        });
    }
    let reference = sequences.first().ok_or(PolyCoreError::EmptySampleSet)?;
    for (seq, name) in sequences.iter().zip(names) {
        if seq.len() != reference.len() {
            return Err(PolyCoreError::LengthMismatch {
                name: name.clone(),
                expected: reference.len(),
                found: seq.len(),
            });
        }
    }
    check_alphabet(sequences)
}

fn expand_alignment(
    matrix: &SampleMatrix,
    groups: &CollapseGroups,
    kept: &[bool],
    names: &[String],
) -> NamedAlignment {
    let rows: Vec<String> = (0..matrix.n_samples()).map(|r| matrix.row_string(r)).collect();
    let expansion = groups.expand_values(&rows, kept, ExpansionPolicy::DropFiltered);
    NamedAlignment {
        names: expansion.names(names),
        sequences: expansion.values.into_iter().flatten().collect(),
    }
}

/// Run the whole analysis on in-memory sequences.
///
/// `sequences[0]` is the reference. Sequences must share one length and use
/// ASCII IUPAC letters, `N` or `-`.
pub fn run_pipeline(
    sequences: &[Vec<u8>],
    names: &[String],
    params: &PipelineParams,
    reporter: &dyn Reporter,
) -> Result<PipelineResult> {
    params.validate()?;
    check_inputs(sequences, names)?;
    let start = Instant::now();

    let collapsed = collapse_sequences(sequences, names, reporter);
    let groups = collapsed.groups;
    let all_reps = vec![true; groups.n_representatives()];

    let ploidy = resolve_ploidy(&collapsed.sequences, params.ploidy, reporter)?;
    let codec = AlleleCodec::new(ploidy)?;

    let stack = SampleMatrix::from_sequences(&collapsed.sequences)?;
    let qc = filter_sequences(&stack, &collapsed.names, &codec, params.min_gf, reporter);
    let kept_names: Vec<String> = qc
        .kept_indices()
        .into_iter()
        .map(|i| collapsed.names[i].clone())
        .collect();
    let kept_matrix = qc.kept_matrix();

    let core = find_core(
        &kept_matrix,
        &kept_names,
        &qc.kept_genome_fractions(),
        params.min_cf,
        params.progressive,
        reporter,
    );
    let variants = find_const(&core.core, ploidy, params.variant_filter(), reporter);
    let bits = codec.to_bits(&variants.variants, reporter)?;
    let distances = calculate_distances(&bits, ploidy, params.chunk_size, reporter)?;

    reporter.info("🔁 Expanding results to original samples");
    let genome_fractions = groups.expand_values(&qc.genome_fractions, &all_reps, ExpansionPolicy::KeepMissing);
    let missing = groups.expand_values(
        &qc.validated.missing_per_row(),
        &all_reps,
        ExpansionPolicy::KeepMissing,
    );
    let core_fractions = groups.expand_values(
        &core.sample_core_fractions,
        &qc.keep,
        ExpansionPolicy::KeepMissing,
    );
    let to_reference: Vec<u64> = if distances.n_samples() > 0 {
        distances.row(0).to_vec()
    } else {
        Vec::new()
    };
    let variant_counts = groups.expand_values(&to_reference, &qc.keep, ExpansionPolicy::KeepMissing);

    let summary = (0..groups.n_original())
        .map(|i| SampleSummary {
            name: names[i].clone(),
            length: qc.validated.n_sites(),
            missing: missing.values[i].unwrap_or(0),
            genome_fraction: genome_fractions.values[i].unwrap_or(0.0),
            core_fraction: core_fractions.values[i],
            variants: variant_counts.values[i],
        })
        .collect();

    let progression = core
        .progression
        .iter()
        .map(|step| (kept_names[step.sample].clone(), step.core_fraction))
        .collect();

    let result = PipelineResult {
        ploidy,
        names: names.to_vec(),
        sites: SiteCounts {
            input: stack.n_sites(),
            removed_reference: qc.removed_reference_sites,
            validated: qc.validated.n_sites(),
            core: core.n_core_sites(),
            variants: variants.n_variants(),
            unfiltered_variants: variants.unfiltered_variants,
        },
        core_fraction: core.core_fraction,
        core_alignment: expand_alignment(&core.core, &groups, &qc.keep, names),
        variant_alignment: expand_alignment(&variants.variants, &groups, &qc.keep, names),
        distances_core: NamedDistances::from_expanded(
            groups.expand_distances(&distances, &qc.keep, ExpansionPolicy::DropFiltered),
            names,
        ),
        distances_full: NamedDistances::from_expanded(
            groups.expand_distances(&distances, &qc.keep, ExpansionPolicy::KeepMissing),
            names,
        ),
        core_mask: core.mask,
        progression,
        constant: variants.constant,
        summary,
        kept: qc.keep,
        groups,
    };

    reporter.info(&format!(
        "🏁 Pipeline finished in {:.2}s",
        start.elapsed().as_secs_f64()
    ));
    Ok(result)
}
