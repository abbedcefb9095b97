// collapse.rs - Deduplication of identical sequences and expansion back

use super::distance::DistanceMatrix;
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How representatives removed by QC appear in expanded results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionPolicy {
    /// Every original sample is present; filtered ones carry `None`
    KeepMissing,
    /// Only samples whose representative was kept are present
    DropFiltered,
}

/// Representative sequences and the groups of originals they stand for
#[derive(Debug, Clone)]
pub struct Collapsed {
    pub sequences: Vec<Vec<u8>>,
    pub names: Vec<String>,
    pub groups: CollapseGroups,
}

/// Representative index → ordered original indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseGroups {
    groups: Vec<Vec<usize>>,
    representative_of: Vec<usize>,
}

/// Per-original-sample values produced by an expansion
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion<T> {
    /// Original sample indices, in input order
    pub samples: Vec<usize>,
    pub values: Vec<Option<T>>,
}

impl<T> Expansion<T> {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Names of the expanded samples
    pub fn names(&self, original_names: &[String]) -> Vec<String> {
        self.samples
            .iter()
            .map(|&i| original_names[i].clone())
            .collect()
    }
}

/// Distance matrix over original samples
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedDistances {
    pub samples: Vec<usize>,
    pub values: Vec<Vec<Option<u64>>>,
}

impl ExpandedDistances {
    pub fn names(&self, original_names: &[String]) -> Vec<String> {
        self.samples
            .iter()
            .map(|&i| original_names[i].clone())
            .collect()
    }
}

/// Group byte-identical sequences. The reference (index 0) always leads the
/// first group; later samples identical to it join that group.
pub fn collapse_sequences(
    sequences: &[Vec<u8>],
    names: &[String],
    reporter: &dyn Reporter,
) -> Collapsed {
    let mut seen: HashMap<&[u8], usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut representative_of = Vec::with_capacity(sequences.len());
    let mut rep_sequences = Vec::new();
    let mut rep_names = Vec::new();

    for (i, seq) in sequences.iter().enumerate() {
        match seen.get(seq.as_slice()) {
            Some(&rep) => {
                groups[rep].push(i);
                representative_of.push(rep);
            }
            None => {
                let rep = groups.len();
                seen.insert(seq.as_slice(), rep);
                groups.push(vec![i]);
                representative_of.push(rep);
                rep_sequences.push(seq.clone());
                rep_names.push(names[i].clone());
            }
        }
    }

    for group in groups.iter().filter(|g| g.len() > 1) {
        let group_names: Vec<&str> = group.iter().map(|&i| names[i].as_str()).collect();
        reporter.info(&format!(
            "👯 Identical samples will be treated as one: [{}] -> {}",
            group_names.join(", "),
            group_names[0]
        ));
    }
    if !sequences.is_empty() {
        reporter.info(&format!(
            "📦 {} sequences collapsed into {} representatives",
            sequences.len(),
            groups.len()
        ));
    }

    Collapsed {
        sequences: rep_sequences,
        names: rep_names,
        groups: CollapseGroups {
            groups,
            representative_of,
        },
    }
}

impl CollapseGroups {
    /// Identity grouping (every sample its own representative)
    pub fn identity(n: usize) -> Self {
        Self {
            groups: (0..n).map(|i| vec![i]).collect(),
            representative_of: (0..n).collect(),
        }
    }

    pub fn n_representatives(&self) -> usize {
        self.groups.len()
    }

    pub fn n_original(&self) -> usize {
        self.representative_of.len()
    }

    pub fn group(&self, rep: usize) -> &[usize] {
        &self.groups[rep]
    }

    pub fn representative_of(&self, original: usize) -> usize {
        self.representative_of[original]
    }

    /// Position of each kept representative among the kept ones
    fn kept_positions(&self, kept: &[bool]) -> Vec<Option<usize>> {
        assert_eq!(
            kept.len(),
            self.groups.len(),
            "kept mask must cover every representative"
        );
        let mut next = 0;
        kept.iter()
            .map(|&k| {
                if k {
                    next += 1;
                    Some(next - 1)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Project per-representative values onto original samples.
    ///
    /// `values` holds one entry per kept representative, in representative
    /// order. Output follows the original input order.
    pub fn expand_values<T: Clone>(
        &self,
        values: &[T],
        kept: &[bool],
        policy: ExpansionPolicy,
    ) -> Expansion<T> {
        let positions = self.kept_positions(kept);
        assert_eq!(
            values.len(),
            positions.iter().flatten().count(),
            "one value per kept representative expected"
        );
        let mut samples = Vec::new();
        let mut out = Vec::new();
        for (original, &rep) in self.representative_of.iter().enumerate() {
            match positions[rep] {
                Some(pos) => {
                    samples.push(original);
                    out.push(Some(values[pos].clone()));
                }
                None if policy == ExpansionPolicy::KeepMissing => {
                    samples.push(original);
                    out.push(None);
                }
                None => {}
            }
        }
        Expansion {
            samples,
            values: out,
        }
    }

    /// Project a representative distance matrix (over kept representatives)
    /// onto original samples: `D[i][j] = D_rep[rep(i)][rep(j)]`.
    pub fn expand_distances(
        &self,
        distances: &DistanceMatrix,
        kept: &[bool],
        policy: ExpansionPolicy,
    ) -> ExpandedDistances {
        let positions = self.kept_positions(kept);
        assert_eq!(
            distances.n_samples(),
            positions.iter().flatten().count(),
            "distance matrix must cover every kept representative"
        );
        let slot = |original: usize| positions[self.representative_of[original]];
        let samples: Vec<usize> = (0..self.n_original())
            .filter(|&o| policy == ExpansionPolicy::KeepMissing || slot(o).is_some())
            .collect();
        let values = samples
            .iter()
            .map(|&a| {
                samples
                    .iter()
                    .map(|&b| match (slot(a), slot(b)) {
                        (Some(pa), Some(pb)) => Some(distances.get(pa, pb)),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        ExpandedDistances { samples, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{MemoryReporter, SilentReporter};

    fn seqs(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collapse_groups() {
        let reporter = MemoryReporter::new();
        let collapsed = collapse_sequences(
            &seqs(&["ACGT", "ACGA", "ACGT", "ACGA", "TTTT"]),
            &names(&["ref", "a", "b", "c", "d"]),
            &reporter,
        );
        assert_eq!(collapsed.names, names(&["ref", "a", "d"]));
        assert_eq!(collapsed.sequences, seqs(&["ACGT", "ACGA", "TTTT"]));
        assert_eq!(collapsed.groups.group(0), &[0, 2]);
        assert_eq!(collapsed.groups.group(1), &[1, 3]);
        assert_eq!(collapsed.groups.group(2), &[4]);
        assert_eq!(collapsed.groups.representative_of(3), 1);
        assert_eq!(collapsed.groups.n_original(), 5);
        assert!(reporter.contains("[ref, b] -> ref"));
    }

    #[test]
    fn test_reference_duplicate_expands_to_two_rows() {
        let original = names(&["Reference", "copy"]);
        let collapsed = collapse_sequences(&seqs(&["ACGT", "ACGT"]), &original, &SilentReporter);
        assert_eq!(collapsed.groups.n_representatives(), 1);
        assert_eq!(collapsed.groups.group(0), &[0, 1]);

        let row = vec!["ACGT".to_string()];
        let expanded = collapsed
            .groups
            .expand_values(&row, &[true], ExpansionPolicy::DropFiltered);
        assert_eq!(expanded.names(&original), original);
        assert_eq!(
            expanded.values,
            vec![Some("ACGT".to_string()), Some("ACGT".to_string())]
        );
    }

    #[test]
    fn test_expand_identity_law() {
        let collapsed = collapse_sequences(
            &seqs(&["AA", "CC", "AA", "GG", "CC"]),
            &names(&["r", "x", "y", "z", "w"]),
            &SilentReporter,
        );
        let rep_values = vec![10, 20, 30];
        let expanded = collapsed.groups.expand_values(
            &rep_values,
            &[true, true, true],
            ExpansionPolicy::KeepMissing,
        );
        assert_eq!(expanded.samples, vec![0, 1, 2, 3, 4]);
        for (original, value) in expanded.samples.iter().zip(&expanded.values) {
            let rep = collapsed.groups.representative_of(*original);
            assert_eq!(*value, Some(rep_values[rep]));
        }
    }

    #[test]
    fn test_expand_policies_with_filtered_representative() {
        let collapsed = collapse_sequences(
            &seqs(&["AA", "CC", "AA", "GG", "CC"]),
            &names(&["r", "x", "y", "z", "w"]),
            &SilentReporter,
        );
        // representative 1 (x, w) removed by QC
        let kept = [true, false, true];
        let keep = collapsed
            .groups
            .expand_values(&[0.5, 0.9], &kept, ExpansionPolicy::KeepMissing);
        assert_eq!(keep.values, vec![Some(0.5), None, Some(0.5), Some(0.9), None]);

        let drop = collapsed
            .groups
            .expand_values(&[0.5, 0.9], &kept, ExpansionPolicy::DropFiltered);
        assert_eq!(drop.samples, vec![0, 2, 3]);
        assert_eq!(drop.values, vec![Some(0.5), Some(0.5), Some(0.9)]);
    }

    #[test]
    fn test_expand_distances_blocks() {
        let collapsed = collapse_sequences(
            &seqs(&["AA", "CC", "AA", "GG", "CC"]),
            &names(&["r", "x", "y", "z", "w"]),
            &SilentReporter,
        );
        let rep = DistanceMatrix::from_upper_triangle(3, &[4, 6, 2]);

        let full = collapsed
            .groups
            .expand_distances(&rep, &[true, true, true], ExpansionPolicy::DropFiltered);
        assert_eq!(full.samples, vec![0, 1, 2, 3, 4]);
        for a in 0..5 {
            for b in 0..5 {
                let ra = collapsed.groups.representative_of(a);
                let rb = collapsed.groups.representative_of(b);
                assert_eq!(full.values[a][b], Some(rep.get(ra, rb)));
            }
        }
        // same group → zero distance
        assert_eq!(full.values[1][4], Some(0));

        let kept_only = DistanceMatrix::from_upper_triangle(2, &[6]);
        let dropped = collapsed.groups.expand_distances(
            &kept_only,
            &[true, false, true],
            ExpansionPolicy::DropFiltered,
        );
        assert_eq!(dropped.names(&names(&["r", "x", "y", "z", "w"])), names(&["r", "y", "z"]));
        assert_eq!(dropped.values[0], vec![Some(0), Some(0), Some(6)]);

        let missing = collapsed.groups.expand_distances(
            &kept_only,
            &[true, false, true],
            ExpansionPolicy::KeepMissing,
        );
        assert_eq!(missing.samples.len(), 5);
        assert_eq!(missing.values[0], vec![Some(0), None, Some(0), Some(6), None]);
        assert!(missing.values[1].iter().all(Option::is_none));
    }

    #[test]
    fn test_empty_input() {
        let collapsed = collapse_sequences(&[], &[], &SilentReporter);
        assert_eq!(collapsed.groups.n_representatives(), 0);
        let expanded = collapsed
            .groups
            .expand_values::<u8>(&[], &[], ExpansionPolicy::KeepMissing);
        assert!(expanded.is_empty());
    }

    #[test]
    fn test_identity_groups() {
        let groups = CollapseGroups::identity(3);
        let expanded = groups.expand_values(&['a', 'b'], &[true, false, true], ExpansionPolicy::KeepMissing);
        assert_eq!(expanded.values, vec![Some('a'), None, Some('b')]);
    }
}
