// match_table.rs - Shared allele copies between two masks at a fixed ploidy

use super::codec::ALLELE_BITS;

/// 16×16 table of allele copies two genotypes can share.
///
/// Masks are read under a fixed-composition rule: one allele carries all
/// `ploidy` copies, `ploidy` alleles carry one copy each. Masks naming more
/// than one but fewer than `ploidy` alleles have no defined composition and
/// are treated as unknown (all-zero counts); the distance kernel skips them
/// like a no-call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTable {
    ploidy: usize,
    table: [[u64; 16]; 16],
    informative: [bool; 16],
}

/// Allele-count vector of a mask under the fixed-composition rule
pub fn mask_to_counts(mask: u8, ploidy: usize) -> [usize; 4] {
    let mut counts = [0usize; 4];
    let k = (mask & 0x0F).count_ones() as usize;
    if k == 1 {
        for (i, &bit) in ALLELE_BITS.iter().enumerate() {
            if mask & bit != 0 {
                counts[i] = ploidy;
            }
        }
    } else if k > 1 && k == ploidy {
        for (i, &bit) in ALLELE_BITS.iter().enumerate() {
            if mask & bit != 0 {
                counts[i] = 1;
            }
        }
    }
    counts
}

impl MatchTable {
    pub fn new(ploidy: usize) -> Self {
        let counts: Vec<[usize; 4]> = (0u8..16).map(|m| mask_to_counts(m, ploidy)).collect();
        let mut table = [[0u64; 16]; 16];
        let mut informative = [false; 16];
        for m1 in 0..16 {
            informative[m1] = counts[m1].iter().any(|&c| c > 0);
            for m2 in 0..16 {
                let shared: usize = counts[m1]
                    .iter()
                    .zip(counts[m2].iter())
                    .map(|(a, b)| *a.min(b))
                    .sum();
                table[m1][m2] = shared as u64;
            }
        }
        Self {
            ploidy,
            table,
            informative,
        }
    }

    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    #[inline]
    pub fn matches(&self, m1: u8, m2: u8) -> u64 {
        self.table[(m1 & 0x0F) as usize][(m2 & 0x0F) as usize]
    }

    /// False for no-calls and for masks whose cardinality is strictly
    /// between 1 and the ploidy
    #[inline]
    pub fn is_informative(&self, mask: u8) -> bool {
        self.informative[(mask & 0x0F) as usize]
    }

    pub fn rows(&self) -> &[[u64; 16]; 16] {
        &self.table
    }
}

/// Convenience wrapper around `MatchTable::new`
pub fn build_match_table(ploidy: usize) -> MatchTable {
    MatchTable::new(ploidy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_match_equals_ploidy() {
        for ploidy in 1..=5 {
            let table = build_match_table(ploidy);
            for m in 1u8..16 {
                let k = m.count_ones() as usize;
                if k == 1 || k == ploidy {
                    assert_eq!(table.matches(m, m) as usize, ploidy, "mask {} ploidy {}", m, ploidy);
                }
            }
        }
    }

    #[test]
    fn test_unknown_row_is_zero() {
        for ploidy in 1..=4 {
            let table = build_match_table(ploidy);
            for m in 0u8..16 {
                assert_eq!(table.matches(0, m), 0);
                assert_eq!(table.matches(m, 0), 0);
            }
            assert!(!table.is_informative(0));
        }
    }

    #[test]
    fn test_diploid_values() {
        let table = build_match_table(2);
        // A/A vs A/G share one copy
        assert_eq!(table.matches(1, 5), 1);
        // A/G vs A/G share both
        assert_eq!(table.matches(5, 5), 2);
        // A/A vs C/C share nothing
        assert_eq!(table.matches(1, 2), 0);
        // A/G vs C/T share nothing
        assert_eq!(table.matches(5, 10), 0);
        assert!(table.is_informative(1));
        assert!(table.is_informative(5));
        // three-allele codes have no diploid composition
        assert!(!table.is_informative(7));
    }

    #[test]
    fn test_tetraploid_two_allele_mask_is_unknown() {
        let table = build_match_table(4);
        assert_eq!(mask_to_counts(5, 4), [0, 0, 0, 0]);
        assert!(!table.is_informative(5));
        assert_eq!(table.matches(5, 5), 0);
        assert_eq!(table.matches(1, 5), 0);
        assert!(table.is_informative(1));
        assert!(table.is_informative(15));
        assert_eq!(table.matches(15, 1), 1);
        assert_eq!(table.matches(1, 1), 4);
    }

    #[test]
    fn test_large_ploidy_is_not_clamped() {
        for ploidy in [255, 256, 300, 1000] {
            let table = build_match_table(ploidy);
            assert_eq!(table.matches(1, 1), ploidy as u64);
            assert_eq!(table.matches(1, 2), 0);
        }
    }

    #[test]
    fn test_table_is_symmetric() {
        for ploidy in 1..=4 {
            let table = build_match_table(ploidy);
            for a in 0u8..16 {
                for b in 0u8..16 {
                    assert_eq!(table.matches(a, b), table.matches(b, a));
                }
            }
        }
    }
}
