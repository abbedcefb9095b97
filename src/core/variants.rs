// variants.rs - Variant / constant site classification against the reference

use crate::data::matrix::{SampleMatrix, MISSING_BASE};
use crate::reporter::Reporter;
use serde::Serialize;

/// Reference base counts at constant sites, scaled by ploidy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConstantSites {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub t: usize,
}

impl ConstantSites {
    /// `A,C,G,T` line
    pub fn to_line(&self) -> String {
        format!("{},{},{},{}", self.a, self.c, self.g, self.t)
    }
}

/// Frequency and count filters applied on top of the variant test
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariantFilter {
    /// Minimum fraction of informative samples calling a non-reference base
    pub min_pf: f64,
    /// Minimum number of samples calling a non-reference base
    pub min_pn: usize,
}

impl VariantFilter {
    pub fn is_active(&self) -> bool {
        self.min_pf > 0.0 || self.min_pn > 0
    }
}

/// Variant sub-matrix plus the constant-site summary
#[derive(Debug, Clone)]
pub struct VariantSites {
    /// Core matrix restricted to variant sites (same rows)
    pub variants: SampleMatrix,
    /// Variant flag per core site
    pub mask: Vec<bool>,
    /// Variant sites before the frequency/count filters
    pub unfiltered_variants: usize,
    pub constant: ConstantSites,
}

impl VariantSites {
    pub fn n_variants(&self) -> usize {
        self.variants.n_sites()
    }

    pub fn n_constant(&self) -> usize {
        self.mask.len() - self.n_variants()
    }
}

/// Split core sites into variant and constant sites.
///
/// A site is variant when at least one informative (non-`N`) sample differs
/// from the reference row.
pub fn find_const(
    core: &SampleMatrix,
    ploidy: usize,
    filter: VariantFilter,
    reporter: &dyn Reporter,
) -> VariantSites {
    reporter.info("🔎 Finding constant / variable sites");
    let n_sites = core.n_sites();

    if core.n_samples() == 0 {
        reporter.info("ℹ️  No samples left, every site treated as constant");
        return VariantSites {
            variants: SampleMatrix::empty(0),
            mask: vec![false; n_sites],
            unfiltered_variants: 0,
            constant: ConstantSites::default(),
        };
    }

    let reference = core.row(0);
    let mut n_matches = vec![0usize; n_sites];
    let mut informative = vec![0usize; n_sites];
    for row in core.rows().skip(1) {
        for (site, &b) in row.iter().enumerate() {
            if b != MISSING_BASE {
                informative[site] += 1;
                if b == reference[site] {
                    n_matches[site] += 1;
                }
            }
        }
    }

    let mut mask: Vec<bool> = n_matches
        .iter()
        .zip(&informative)
        .map(|(&m, &inf)| m < inf)
        .collect();
    let unfiltered_variants = mask.iter().filter(|&&v| v).count();
    reporter.info(&format!("🧬 Found {} variants", unfiltered_variants));

    if filter.is_active() {
        for site in 0..n_sites {
            let non_ref = informative[site] - n_matches[site];
            let frac_non_ref = non_ref as f64 / informative[site].max(1) as f64;
            mask[site] = mask[site] && frac_non_ref >= filter.min_pf && non_ref >= filter.min_pn;
        }
        reporter.info(&format!(
            "🧬 Filtered to {} variants (min-pf: {}, min-pn: {})",
            mask.iter().filter(|&&v| v).count(),
            filter.min_pf,
            filter.min_pn
        ));
    }

    let mut constant = ConstantSites::default();
    for (&base, _) in reference.iter().zip(&mask).filter(|(_, &v)| !v) {
        match base {
            b'A' => constant.a += ploidy,
            b'C' => constant.c += ploidy,
            b'G' => constant.g += ploidy,
            b'T' => constant.t += ploidy,
            _ => {}
        }
    }
    let variants = core.select_columns(&mask);
    reporter.info(&format!(
        "📌 Remaining {} sites treated as constant",
        n_sites - variants.n_sites()
    ));

    VariantSites {
        variants,
        mask,
        unfiltered_variants,
        constant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::SilentReporter;

    #[test]
    fn test_single_mismatch_is_variant() {
        let core = SampleMatrix::from_sequences(&["ACGT", "ACGA"]).unwrap();
        let result = find_const(&core, 1, VariantFilter::default(), &SilentReporter);
        assert_eq!(result.mask, vec![false, false, false, true]);
        assert_eq!(result.n_variants(), 1);
        assert_eq!(result.variants.row_string(0), "T");
        assert_eq!(result.variants.row_string(1), "A");
        assert_eq!(result.constant, ConstantSites { a: 1, c: 1, g: 1, t: 0 });
    }

    #[test]
    fn test_missing_calls_are_not_informative() {
        let core = SampleMatrix::from_sequences(&["ACGT", "NCGT", "ANGT"]).unwrap();
        let result = find_const(&core, 2, VariantFilter::default(), &SilentReporter);
        assert_eq!(result.n_variants(), 0);
        assert_eq!(result.variants.n_samples(), 3);
        assert_eq!(result.constant.to_line(), "2,2,2,2");
    }

    #[test]
    fn test_frequency_and_count_filters() {
        // site 0: 1/4 alt, site 1: 3/4 alt, site 2: 1/1 informative alt
        let core = SampleMatrix::from_sequences(&["AAA", "CCN", "ACN", "ACN", "AAT"]).unwrap();
        let none = find_const(&core, 1, VariantFilter::default(), &SilentReporter);
        assert_eq!(none.mask, vec![true, true, true]);

        let by_fraction = VariantFilter { min_pf: 0.5, min_pn: 0 };
        let result = find_const(&core, 1, by_fraction, &SilentReporter);
        assert_eq!(result.mask, vec![false, true, true]);
        assert_eq!(result.unfiltered_variants, 3);

        let by_count = VariantFilter { min_pf: 0.0, min_pn: 2 };
        let result = find_const(&core, 1, by_count, &SilentReporter);
        assert_eq!(result.mask, vec![false, true, false]);
        assert_eq!(result.constant, ConstantSites { a: 2, c: 0, g: 0, t: 0 });
    }

    #[test]
    fn test_uninformative_site_with_filter() {
        let core = SampleMatrix::from_sequences(&["AC", "NC"]).unwrap();
        let filter = VariantFilter { min_pf: 0.1, min_pn: 1 };
        let result = find_const(&core, 1, filter, &SilentReporter);
        assert_eq!(result.n_variants(), 0);
        assert_eq!(result.n_constant(), 2);
    }

    #[test]
    fn test_degenerate_shapes() {
        let no_rows = SampleMatrix::empty(0);
        let result = find_const(&no_rows, 2, VariantFilter::default(), &SilentReporter);
        assert_eq!(result.variants.n_samples(), 0);
        assert_eq!(result.constant, ConstantSites::default());

        let reference_only = SampleMatrix::from_sequences(&["ACGT"]).unwrap();
        let result = find_const(&reference_only, 1, VariantFilter::default(), &SilentReporter);
        assert_eq!(result.n_variants(), 0);
        assert_eq!(result.variants.n_samples(), 1);
        assert_eq!(result.variants.n_sites(), 0);
    }
}
