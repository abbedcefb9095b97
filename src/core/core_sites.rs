// core_sites.rs - Core-site selection (global and progressive soft-core)

use crate::data::matrix::{SampleMatrix, MISSING_BASE};
use crate::reporter::Reporter;

/// One step of the progressive core trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionStep {
    /// Row of the input matrix added at this step
    pub sample: usize,
    pub core_fraction: f64,
}

/// Result of core-site selection
#[derive(Debug, Clone)]
pub struct CoreSelection {
    /// Input matrix restricted to core sites, rows in input order
    pub core: SampleMatrix,
    /// Core flag for every input site
    pub mask: Vec<bool>,
    /// Final core fraction (core sites / input sites)
    pub core_fraction: f64,
    /// Core fraction associated with each input row
    pub sample_core_fractions: Vec<f64>,
    /// Trajectory in addition order (empty in non-progressive mode)
    pub progression: Vec<ProgressionStep>,
}

impl CoreSelection {
    pub fn n_core_sites(&self) -> usize {
        self.core.n_sites()
    }
}

/// Proportion of sites flagged in `mask` (0.0 for an empty mask)
fn fraction_true(mask: &[bool]) -> f64 {
    if mask.is_empty() {
        0.0
    } else {
        mask.iter().filter(|&&m| m).count() as f64 / mask.len() as f64
    }
}

/// Core mask from per-site called counts over `n_rows` samples
fn mask_from_counts(called: &[usize], n_rows: usize, threshold: f64) -> Vec<bool> {
    called
        .iter()
        .map(|&c| n_rows > 0 && c as f64 / n_rows as f64 >= threshold)
        .collect()
}

/// Per-site core mask computed over the given rows only
pub fn core_mask_for_rows(matrix: &SampleMatrix, rows: &[usize], threshold: f64) -> Vec<bool> {
    let mut called = vec![0usize; matrix.n_sites()];
    for &r in rows {
        for (count, &b) in called.iter_mut().zip(matrix.row(r)) {
            if b != MISSING_BASE {
                *count += 1;
            }
        }
    }
    mask_from_counts(&called, rows.len(), threshold)
}

/// Core fraction over the given rows only
pub fn core_fraction_for_rows(matrix: &SampleMatrix, rows: &[usize], threshold: f64) -> f64 {
    fraction_true(&core_mask_for_rows(matrix, rows, threshold))
}

/// Select core sites.
///
/// Non-progressive: one pass over all rows. Progressive: non-reference rows
/// are added in descending genome fraction (stable on ties) after the
/// reference, recording the core fraction after each addition. Rows of the
/// returned matrix keep their input order in both modes.
pub fn find_core(
    matrix: &SampleMatrix,
    names: &[String],
    genome_fractions: &[f64],
    threshold: f64,
    progressive: bool,
    reporter: &dyn Reporter,
) -> CoreSelection {
    let n_rows = matrix.n_samples();
    let n_sites = matrix.n_sites();

    if !progressive || n_rows == 0 {
        reporter.info("🧬 Determining core (non-progressive)");
        let all_rows: Vec<usize> = (0..n_rows).collect();
        let mask = core_mask_for_rows(matrix, &all_rows, threshold);
        return finish(matrix, mask, vec![], threshold, reporter, |cf| vec![cf; n_rows]);
    }

    reporter.info("🧬 Determining soft-core (progressive):");
    let mut order: Vec<usize> = (1..n_rows).collect();
    order.sort_by(|&a, &b| {
        genome_fractions[b]
            .partial_cmp(&genome_fractions[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.insert(0, 0);

    let mut called = vec![0usize; n_sites];
    let mut progression = Vec::with_capacity(n_rows);
    let mut mask = Vec::new();
    for (step, &row) in order.iter().enumerate() {
        for (count, &b) in called.iter_mut().zip(matrix.row(row)) {
            if b != MISSING_BASE {
                *count += 1;
            }
        }
        mask = mask_from_counts(&called, step + 1, threshold);
        let core_fraction = fraction_true(&mask);
        let name = names.get(row).map(String::as_str).unwrap_or("?");
        reporter.info(&format!(
            "  {}/{}: {} ({:.2})",
            step + 1,
            n_rows,
            name,
            core_fraction
        ));
        progression.push(ProgressionStep {
            sample: row,
            core_fraction,
        });
    }

    let mut per_sample = vec![0.0; n_rows];
    for step in &progression {
        per_sample[step.sample] = step.core_fraction;
    }
    finish(matrix, mask, progression, threshold, reporter, move |_| per_sample)
}

fn finish<F: FnOnce(f64) -> Vec<f64>>(
    matrix: &SampleMatrix,
    mask: Vec<bool>,
    progression: Vec<ProgressionStep>,
    threshold: f64,
    reporter: &dyn Reporter,
    per_sample: F,
) -> CoreSelection {
    let core_fraction = fraction_true(&mask);
    let below = mask.iter().filter(|&&m| !m).count();
    reporter.info(&format!("📉 Sites below min-cf ({}): {}", threshold, below));
    reporter.info(&format!("📊 Final core fraction: {:.2}", core_fraction));
    let core = matrix.select_columns(&mask);
    CoreSelection {
        core,
        sample_core_fractions: per_sample(core_fraction),
        mask,
        core_fraction,
        progression,
    }
}
