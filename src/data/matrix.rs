// matrix.rs - Owned sample × site matrices

use crate::error::{PolyCoreError, Result};

/// Missing-data marker used after reference validation
pub const MISSING_BASE: u8 = b'N';

/// Row-major sample × site matrix.
///
/// Stages never narrow a matrix in place: `select_rows` and `select_columns`
/// return new owned snapshots that keep the relative order of what remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMatrix<T> {
    n_samples: usize,
    n_sites: usize,
    data: Vec<T>,
}

/// Matrix of aligned base characters, row 0 is the reference
pub type SampleMatrix = SiteMatrix<u8>;

impl<T: Copy> SiteMatrix<T> {
    /// Build from a flat row-major buffer
    pub fn from_flat(n_samples: usize, n_sites: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            n_samples * n_sites,
            "flat buffer does not match matrix dimensions"
        );
        Self {
            n_samples,
            n_sites,
            data,
        }
    }

    /// Matrix with `n_samples` rows and no sites
    pub fn empty(n_samples: usize) -> Self {
        Self {
            n_samples,
            n_sites: 0,
            data: Vec::new(),
        }
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, sample: usize, site: usize) -> T {
        self.data[sample * self.n_sites + site]
    }

    #[inline]
    pub fn row(&self, sample: usize) -> &[T] {
        let start = sample * self.n_sites;
        &self.data[start..start + self.n_sites]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.n_samples).map(move |i| self.row(i))
    }

    pub fn as_flat(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every cell
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> SiteMatrix<U> {
        SiteMatrix {
            n_samples: self.n_samples,
            n_sites: self.n_sites,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.n_sites);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            n_samples: indices.len(),
            n_sites: self.n_sites,
            data,
        }
    }

    /// New matrix holding the rows flagged in `keep`
    pub fn filter_rows(&self, keep: &[bool]) -> Self {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| if k { Some(i) } else { None })
            .collect();
        self.select_rows(&indices)
    }

    /// New matrix holding the columns flagged in `keep`
    pub fn select_columns(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.n_sites, "column mask length mismatch");
        let n_kept = keep.iter().filter(|&&k| k).count();
        let mut data = Vec::with_capacity(self.n_samples * n_kept);
        for row in self.rows() {
            data.extend(
                row.iter()
                    .zip(keep)
                    .filter_map(|(&v, &k)| if k { Some(v) } else { None }),
            );
        }
        Self {
            n_samples: self.n_samples,
            n_sites: n_kept,
            data,
        }
    }
}

impl SampleMatrix {
    /// Stack equal-length sequences into a matrix
    pub fn from_sequences<S: AsRef<[u8]>>(sequences: &[S]) -> Result<Self> {
        let n_sites = sequences.first().map(|s| s.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(sequences.len() * n_sites);
        for (i, seq) in sequences.iter().enumerate() {
            let seq = seq.as_ref();
            if seq.len() != n_sites {
                return Err(PolyCoreError::LengthMismatch {
                    name: format!("sequence #{}", i + 1),
                    expected: n_sites,
                    found: seq.len(),
                });
            }
            data.extend_from_slice(seq);
        }
        Ok(Self {
            n_samples: sequences.len(),
            n_sites,
            data,
        })
    }

    /// Number of missing (`N`) cells per row
    pub fn missing_per_row(&self) -> Vec<usize> {
        self.rows()
            .map(|row| row.iter().filter(|&&b| b == MISSING_BASE).count())
            .collect()
    }

    /// Row as an owned string (for FASTA emission)
    pub fn row_string(&self, sample: usize) -> String {
        String::from_utf8_lossy(self.row(sample)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> SampleMatrix {
        SampleMatrix::from_sequences(&["ACGT", "ANGT", "TTTN"]).unwrap()
    }

    #[test]
    fn test_from_sequences() {
        let m = matrix();
        assert_eq!(m.n_samples(), 3);
        assert_eq!(m.n_sites(), 4);
        assert_eq!(m.row(1), b"ANGT");
        assert_eq!(m.get(2, 3), b'N');
        assert_eq!(m.missing_per_row(), vec![0, 1, 1]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = SampleMatrix::from_sequences(&["ACGT", "ACG"]).unwrap_err();
        assert!(matches!(err, PolyCoreError::LengthMismatch { expected: 4, found: 3, .. }));
    }

    #[test]
    fn test_narrowing_keeps_order() {
        let m = matrix();
        let cols = m.select_columns(&[true, false, false, true]);
        assert_eq!(cols.n_sites(), 2);
        assert_eq!(cols.row_string(0), "AT");
        assert_eq!(cols.row_string(2), "TN");
        // Source matrix is untouched
        assert_eq!(m.n_sites(), 4);

        let rows = m.filter_rows(&[true, false, true]);
        assert_eq!(rows.n_samples(), 2);
        assert_eq!(rows.row_string(1), "TTTN");

        let reordered = m.select_rows(&[2, 0]);
        assert_eq!(reordered.row_string(0), "TTTN");
    }

    #[test]
    fn test_zero_rows_and_columns() {
        let m = matrix();
        let none = m.filter_rows(&[false, false, false]);
        assert_eq!(none.n_samples(), 0);
        assert_eq!(none.n_sites(), 4);
        assert!(none.missing_per_row().is_empty());

        let no_cols = m.select_columns(&[false; 4]);
        assert_eq!(no_cols.n_samples(), 3);
        assert_eq!(no_cols.n_sites(), 0);
        assert_eq!(no_cols.row(1), b"");
    }
}
