// distance.rs - Chunked, ploidy-aware pairwise mismatch distances

use super::codec::MaskMatrix;
use super::match_table::MatchTable;
use crate::error::{PolyCoreError, Result};
use crate::reporter::Reporter;
use rayon::prelude::*;
use std::time::Instant;

/// Pairs handled by one parallel task
const PAIR_BLOCK: usize = 4096;

/// Smallest chunk `auto_chunk_size` will propose
pub const MIN_AUTO_CHUNK: usize = 1000;

/// Symmetric n×n matrix of mismatching allele copies, zero diagonal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<u64>,
}

impl DistanceMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0; n * n],
        }
    }

    /// Mirror a row-major upper triangle (without diagonal) into a full matrix
    pub fn from_upper_triangle(n: usize, upper: &[u64]) -> Self {
        let pairs = PairIndex::new(n);
        assert_eq!(upper.len(), pairs.len(), "upper triangle length mismatch");
        let mut matrix = Self::zeros(n);
        for (p, &d) in upper.iter().enumerate() {
            let (i, j) = pairs.pair_at(p);
            matrix.data[i * n + j] = d;
            matrix.data[j * n + i] = d;
        }
        matrix
    }

    pub fn n_samples(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        (0..self.n).map(|i| self.row(i).to_vec()).collect()
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (i + 1..self.n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.n).all(|i| self.get(i, i) == 0)
    }
}

/// Row-major enumeration of the unordered pairs (i, j), i < j, of n samples
#[derive(Debug, Clone, Copy)]
pub struct PairIndex {
    n: usize,
}

impl PairIndex {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn len(&self) -> usize {
        self.n * self.n.saturating_sub(1) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of the first pair in row `i`
    #[inline]
    pub fn row_offset(&self, i: usize) -> usize {
        i * self.n - i * (i + 1) / 2
    }

    /// Flat index of the pair (i, j), i < j
    pub fn index_of(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.n);
        self.row_offset(i) + (j - i - 1)
    }

    /// Pair at flat index `p`
    pub fn pair_at(&self, p: usize) -> (usize, usize) {
        debug_assert!(p < self.len());
        let b = (2 * self.n - 1) as f64;
        let disc = (b * b - 8.0 * p as f64).max(0.0);
        let mut i = ((b - disc.sqrt()) / 2.0).floor().max(0.0) as usize;
        i = i.min(self.n.saturating_sub(2));
        while i > 0 && self.row_offset(i) > p {
            i -= 1;
        }
        while i + 1 < self.n.saturating_sub(1) && self.row_offset(i + 1) <= p {
            i += 1;
        }
        (i, p - self.row_offset(i) + i + 1)
    }
}

/// Per-site mismatch cost for every pair of masks.
///
/// Zero whenever either mask is uninformative, otherwise
/// `ploidy - shared copies`.
struct MismatchCost {
    cost: [[u64; 16]; 16],
}

impl MismatchCost {
    fn new(table: &MatchTable) -> Self {
        let ploidy = table.ploidy() as u64;
        let mut cost = [[0u64; 16]; 16];
        for m1 in 0u8..16 {
            for m2 in 0u8..16 {
                if table.is_informative(m1) && table.is_informative(m2) {
                    cost[m1 as usize][m2 as usize] = ploidy - table.matches(m1, m2);
                }
            }
        }
        Self { cost }
    }

    #[inline]
    fn pair(&self, a: &[u8], b: &[u8]) -> u64 {
        a.iter()
            .zip(b)
            .map(|(&m1, &m2)| self.cost[(m1 & 0x0F) as usize][(m2 & 0x0F) as usize])
            .sum()
    }
}

/// Pairwise distances over a mask matrix.
///
/// Sites are processed in consecutive chunks of at most `chunk_size`
/// columns; each chunk is copied into a contiguous n × w buffer and the pair
/// space is split into blocks accumulated in parallel. Peak transient memory
/// is `8·n(n−1)/2` bytes for the triangle accumulator plus `n·chunk_size`
/// bytes for the chunk buffer, plus `8·n²` for the returned matrix. The result
/// does not depend on `chunk_size`.
pub fn calculate_distances(
    bits: &MaskMatrix,
    ploidy: usize,
    chunk_size: usize,
    reporter: &dyn Reporter,
) -> Result<DistanceMatrix> {
    if chunk_size == 0 {
        return Err(PolyCoreError::InvalidChunkSize(chunk_size));
    }
    if ploidy == 0 {
        return Err(PolyCoreError::InvalidPloidy(ploidy));
    }

    let n = bits.n_samples();
    let n_sites = bits.n_sites();
    let pairs = PairIndex::new(n);
    let cost = MismatchCost::new(&MatchTable::new(ploidy));
    let start = Instant::now();

    reporter.info(&format!(
        "📏 Calculating pairwise distances in {} bp chunks ({} samples, {} sites, {} pairs)",
        chunk_size,
        n,
        n_sites,
        pairs.len()
    ));

    let mut upper = vec![0u64; pairs.len()];
    let width = chunk_size.min(n_sites);
    let mut buffer = vec![0u8; n * width];
    let n_chunks = n_sites.div_ceil(chunk_size);
    let pb = reporter.progress_bar(n_chunks as u64, "chunks");

    for chunk_start in (0..n_sites).step_by(chunk_size) {
        let chunk_end = (chunk_start + chunk_size).min(n_sites);
        let w = chunk_end - chunk_start;
        let chunk = &mut buffer[..n * w];
        for r in 0..n {
            chunk[r * w..(r + 1) * w].copy_from_slice(&bits.row(r)[chunk_start..chunk_end]);
        }
        let chunk: &[u8] = chunk;

        upper
            .par_chunks_mut(PAIR_BLOCK)
            .enumerate()
            .for_each(|(block, slots)| {
                let (mut i, mut j) = pairs.pair_at(block * PAIR_BLOCK);
                for slot in slots.iter_mut() {
                    *slot += cost.pair(&chunk[i * w..(i + 1) * w], &chunk[j * w..(j + 1) * w]);
                    j += 1;
                    if j == n {
                        i += 1;
                        j = i + 1;
                    }
                }
            });
        pb.inc(1);
    }
    pb.finish_and_clear();

    reporter.info(&format!(
        "✅ Distance matrix computed in {:.2}s",
        start.elapsed().as_secs_f64()
    ));
    Ok(DistanceMatrix::from_upper_triangle(n, &upper))
}

/// Largest chunk that keeps the engine within 80% of `available_bytes`,
/// never below `MIN_AUTO_CHUNK` sites.
///
/// Budget: `16·n²` bytes for the accumulator, the result matrix and
/// headroom, the rest for the `n × chunk` buffer.
pub fn auto_chunk_size(n_samples: usize, available_bytes: u64) -> usize {
    let budget = available_bytes as f64 * 0.8;
    let n = n_samples.max(1) as f64;
    let fixed = 16.0 * n * n;
    let per_site = n;
    let chunk = ((budget - fixed) / per_site).floor();
    if chunk.is_finite() && chunk > MIN_AUTO_CHUNK as f64 {
        chunk.min(usize::MAX as f64) as usize
    } else {
        MIN_AUTO_CHUNK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::AlleleCodec;
    use crate::data::matrix::SampleMatrix;
    use crate::reporter::SilentReporter;

    fn encode(seqs: &[&str], ploidy: usize) -> MaskMatrix {
        let codec = AlleleCodec::new(ploidy).unwrap();
        let matrix = SampleMatrix::from_sequences(seqs).unwrap();
        codec.to_bits(&matrix, &SilentReporter).unwrap()
    }

    /// Straightforward nested-loop version of the kernel
    fn naive(bits: &MaskMatrix, ploidy: usize) -> Vec<Vec<u64>> {
        let table = MatchTable::new(ploidy);
        let n = bits.n_samples();
        let mut d = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let mut total = 0u64;
                for s in 0..bits.n_sites() {
                    let (a, b) = (bits.get(i, s), bits.get(j, s));
                    if table.is_informative(a) && table.is_informative(b) {
                        total += (ploidy - table.matches(a, b) as usize) as u64;
                    }
                }
                d[i][j] = total;
                d[j][i] = total;
            }
        }
        d
    }

    fn pseudo_random_sequences(n: usize, len: usize, alphabet: &[u8]) -> Vec<String> {
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        (0..n)
            .map(|_| {
                (0..len)
                    .map(|_| {
                        state ^= state << 13;
                        state ^= state >> 7;
                        state ^= state << 17;
                        alphabet[(state % alphabet.len() as u64) as usize] as char
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_haploid_single_difference() {
        let bits = encode(&["ACGT", "ACGA"], 1);
        let d = calculate_distances(&bits, 1, 2, &SilentReporter).unwrap();
        assert_eq!(d.get(0, 1), 1);
        assert_eq!(d.get(1, 0), 1);
        assert_eq!(d.get(0, 0), 0);
    }

    #[test]
    fn test_high_ploidy_single_difference() {
        for ploidy in [255, 256, 300] {
            let bits = encode(&["AAAA", "AAAC"], ploidy);
            let d = calculate_distances(&bits, ploidy, 3, &SilentReporter).unwrap();
            assert_eq!(d.get(0, 1), ploidy as u64, "ploidy {}", ploidy);
        }
    }

    #[test]
    fn test_diploid_partial_mismatch() {
        // A/A vs A/G shares one copy, A/A vs C/C shares none
        let bits = encode(&["AA", "RC"], 2);
        let d = calculate_distances(&bits, 2, 10, &SilentReporter).unwrap();
        assert_eq!(d.get(0, 1), 1 + 2);
    }

    #[test]
    fn test_unknown_sites_skipped() {
        let bits = encode(&["ACGT", "NNGA", "----"], 1);
        let d = calculate_distances(&bits, 1, 3, &SilentReporter).unwrap();
        assert_eq!(d.get(0, 1), 1);
        assert_eq!(d.get(0, 2), 0);
        assert_eq!(d.get(1, 2), 0);
    }

    #[test]
    fn test_ambiguous_below_ploidy_treated_as_unknown() {
        // At ploidy 4 an R (two alleles) has no fixed composition
        let bits = encode(&["AA", "RA"], 4);
        let d = calculate_distances(&bits, 4, 1, &SilentReporter).unwrap();
        assert_eq!(d.get(0, 1), 0);
    }

    #[test]
    fn test_chunk_size_invariance() {
        let seqs = pseudo_random_sequences(9, 53, b"ACGTRYKMN-");
        let refs: Vec<&str> = seqs.iter().map(String::as_str).collect();
        let bits = encode(&refs, 2);
        let expected = naive(&bits, 2);
        for chunk in [1, 7, 53, 1000] {
            let d = calculate_distances(&bits, 2, chunk, &SilentReporter).unwrap();
            assert_eq!(d.to_rows(), expected, "chunk size {}", chunk);
            assert!(d.is_symmetric());
            assert!(d.has_zero_diagonal());
        }
    }

    #[test]
    fn test_many_samples_cross_pair_blocks() {
        // 100 samples = 4950 pairs, more than one parallel block
        let seqs = pseudo_random_sequences(100, 12, b"ACGTN");
        let refs: Vec<&str> = seqs.iter().map(String::as_str).collect();
        let bits = encode(&refs, 1);
        let d = calculate_distances(&bits, 1, 5, &SilentReporter).unwrap();
        assert_eq!(d.to_rows(), naive(&bits, 1));
    }

    #[test]
    fn test_degenerate_inputs() {
        let no_sites = MaskMatrix::empty(3);
        let d = calculate_distances(&no_sites, 2, 10, &SilentReporter).unwrap();
        assert_eq!(d, DistanceMatrix::zeros(3));

        let no_samples = MaskMatrix::empty(0);
        let d = calculate_distances(&no_samples, 2, 10, &SilentReporter).unwrap();
        assert_eq!(d.n_samples(), 0);

        assert_eq!(
            calculate_distances(&no_sites, 2, 0, &SilentReporter),
            Err(PolyCoreError::InvalidChunkSize(0))
        );
    }

    #[test]
    fn test_pair_index_enumeration() {
        for n in [2usize, 3, 5, 17, 64, 301] {
            let pairs = PairIndex::new(n);
            let mut p = 0;
            for i in 0..n {
                for j in i + 1..n {
                    assert_eq!(pairs.pair_at(p), (i, j), "n={} p={}", n, p);
                    assert_eq!(pairs.index_of(i, j), p);
                    p += 1;
                }
            }
            assert_eq!(p, pairs.len());
        }
        assert!(PairIndex::new(1).is_empty());
        assert!(PairIndex::new(0).is_empty());
    }

    #[test]
    fn test_auto_chunk_size() {
        // Tiny memory falls back to the floor
        assert_eq!(auto_chunk_size(1000, 1024), MIN_AUTO_CHUNK);
        // 10 samples with 1 GB: (0.8e9 - 1600) / 10
        assert_eq!(auto_chunk_size(10, 1_000_000_000), 79_999_840);
        assert!(auto_chunk_size(0, 1_000_000) >= MIN_AUTO_CHUNK);
    }
}
