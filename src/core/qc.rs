// qc.rs - Reference validation and genome-fraction filtering

use super::codec::AlleleCodec;
use crate::data::matrix::{SampleMatrix, MISSING_BASE};
use crate::reporter::Reporter;

/// Outcome of sample quality control
#[derive(Debug, Clone)]
pub struct QcResult {
    /// All samples, restricted to sites with a valid reference base; every
    /// base not representable at the run's ploidy is rewritten to `N`
    pub validated: SampleMatrix,
    /// Sites dropped because the reference base was invalid
    pub removed_reference_sites: usize,
    /// Per-sample fraction of called sites
    pub genome_fractions: Vec<f64>,
    /// Samples meeting the genome-fraction threshold
    pub keep: Vec<bool>,
}

impl QcResult {
    pub fn n_kept(&self) -> usize {
        self.keep.iter().filter(|&&k| k).count()
    }

    /// Indices of kept samples, in input order
    pub fn kept_indices(&self) -> Vec<usize> {
        self.keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| if k { Some(i) } else { None })
            .collect()
    }

    /// Validated matrix restricted to kept samples
    pub fn kept_matrix(&self) -> SampleMatrix {
        self.validated.filter_rows(&self.keep)
    }

    /// Genome fractions of kept samples
    pub fn kept_genome_fractions(&self) -> Vec<f64> {
        self.genome_fractions
            .iter()
            .zip(&self.keep)
            .filter_map(|(&gf, &k)| if k { Some(gf) } else { None })
            .collect()
    }
}

/// Fraction of called (non-`N`) sites in each row; 0.0 when there are no sites
pub fn genome_fractions(matrix: &SampleMatrix) -> Vec<f64> {
    let n_sites = matrix.n_sites();
    matrix
        .missing_per_row()
        .into_iter()
        .map(|missing| {
            if n_sites == 0 {
                0.0
            } else {
                (n_sites - missing) as f64 / n_sites as f64
            }
        })
        .collect()
}

/// Drop invalid reference sites, mask invalid bases and apply `min_gf`
pub fn filter_sequences(
    stack: &SampleMatrix,
    names: &[String],
    codec: &AlleleCodec,
    min_gf: f64,
    reporter: &dyn Reporter,
) -> QcResult {
    let valid_reference: Vec<bool> = if stack.n_samples() == 0 {
        vec![false; stack.n_sites()]
    } else {
        stack.row(0).iter().map(|&b| codec.is_valid(b)).collect()
    };
    let narrowed = stack.select_columns(&valid_reference);
    let removed_reference_sites = stack.n_sites() - narrowed.n_sites();
    reporter.info(&format!(
        "🧹 Removed {} invalid reference positions",
        removed_reference_sites
    ));

    let validated = narrowed.map(|b| {
        if codec.is_valid(b) {
            b.to_ascii_uppercase()
        } else {
            MISSING_BASE
        }
    });

    reporter.info(&format!(
        "🔍 Filtering {} sequences, min_gf={}",
        validated.n_samples(),
        min_gf
    ));
    let genome_fractions = genome_fractions(&validated);
    let keep: Vec<bool> = genome_fractions.iter().map(|&gf| gf >= min_gf).collect();

    let n_kept = keep.iter().filter(|&&k| k).count();
    reporter.info(&format!("✅ Kept {}/{} sequences", n_kept, keep.len()));
    let dropped: Vec<&str> = names
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| !k)
        .map(|(name, _)| name.as_str())
        .collect();
    if !dropped.is_empty() {
        reporter.warn(&format!(
            "Sequences with genome fraction below {}: {}",
            min_gf,
            dropped.join(", ")
        ));
    }

    QcResult {
        validated,
        removed_reference_sites,
        genome_fractions,
        keep,
    }
}
