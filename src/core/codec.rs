// codec.rs - IUPAC characters to ploidy-aware allele bitmasks

use crate::data::matrix::{SampleMatrix, SiteMatrix};
use crate::error::{PolyCoreError, Result};
use crate::reporter::Reporter;

/// Bit per allele: A=1, C=2, G=4, T=8
pub const ALLELE_BITS: [u8; 4] = [1, 2, 4, 8];

/// Canonical IUPAC masks (ambiguity codes are ORs of their alleles)
pub const IUPAC_BITS: [(u8, u8); 14] = [
    (b'A', 1),
    (b'C', 2),
    (b'G', 4),
    (b'T', 8),
    (b'R', 1 | 4),
    (b'Y', 2 | 8),
    (b'S', 4 | 2),
    (b'W', 1 | 8),
    (b'K', 4 | 8),
    (b'M', 1 | 2),
    (b'B', 2 | 4 | 8),
    (b'D', 1 | 4 | 8),
    (b'H', 1 | 2 | 8),
    (b'V', 1 | 2 | 4),
];

/// Per-(sample, site) allele masks, 0 = no call
pub type MaskMatrix = SiteMatrix<u8>;

/// Canonical mask of a base, case-insensitive, 0 when not an IUPAC code
pub fn canonical_mask(base: u8) -> u8 {
    let upper = base.to_ascii_uppercase();
    IUPAC_BITS
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, bits)| *bits)
        .unwrap_or(0)
}

/// Number of alleles a base code stands for (0 for N, gaps and unknown codes)
pub fn ambiguity_size(base: u8) -> usize {
    canonical_mask(base).count_ones() as usize
}

/// Characters accepted by `to_bits`: IUPAC letters, N and gap
fn in_alphabet(base: u8) -> bool {
    canonical_mask(base) != 0 || matches!(base, b'N' | b'n' | b'-')
}

fn check_row(row: &[u8], sample: usize) -> Result<()> {
    for (site, &base) in row.iter().enumerate() {
        if !base.is_ascii() {
            return Err(PolyCoreError::NonAscii {
                byte: base,
                sample,
                site,
            });
        }
        if !in_alphabet(base) {
            return Err(PolyCoreError::InvalidCharacter {
                character: base as char,
                sample,
                site,
            });
        }
    }
    Ok(())
}

/// Reject non-ASCII bytes and characters outside IUPAC letters, N and gap
pub fn check_alphabet<S: AsRef<[u8]>>(sequences: &[S]) -> Result<()> {
    for (sample, seq) in sequences.iter().enumerate() {
        check_row(seq.as_ref(), sample)?;
    }
    Ok(())
}

/// Largest ambiguity cardinality seen in any sequence, at least 1
pub fn infer_ploidy<S: AsRef<[u8]>>(sequences: &[S]) -> usize {
    let mut seen = [false; 256];
    for seq in sequences {
        for &b in seq.as_ref() {
            seen[b as usize] = true;
        }
    }
    seen.iter()
        .enumerate()
        .filter(|(_, &present)| present)
        .map(|(b, _)| ambiguity_size(b as u8))
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Use the requested ploidy or infer it from the data
pub fn resolve_ploidy<S: AsRef<[u8]>>(
    sequences: &[S],
    requested: Option<usize>,
    reporter: &dyn Reporter,
) -> Result<usize> {
    match requested {
        Some(0) => Err(PolyCoreError::InvalidPloidy(0)),
        Some(ploidy) => {
            reporter.info(&format!("🧬 Using specified ploidy: {}", ploidy));
            Ok(ploidy)
        }
        None => {
            let ploidy = infer_ploidy(sequences);
            reporter.info(&format!("🧬 Auto-detected ploidy: {}", ploidy));
            Ok(ploidy)
        }
    }
}

/// Lookup table from ASCII bytes to allele masks for one ploidy.
///
/// Codes standing for more alleles than the ploidy map to 0, as does
/// anything that is not an IUPAC letter.
#[derive(Debug, Clone)]
pub struct AlleleCodec {
    ploidy: usize,
    lut: [u8; 128],
}

impl AlleleCodec {
    pub fn new(ploidy: usize) -> Result<Self> {
        if ploidy == 0 {
            return Err(PolyCoreError::InvalidPloidy(ploidy));
        }
        let mut lut = [0u8; 128];
        for &(code, bits) in IUPAC_BITS.iter() {
            if bits.count_ones() as usize <= ploidy {
                lut[code as usize] = bits;
                lut[code.to_ascii_lowercase() as usize] = bits;
            }
        }
        Ok(Self { ploidy, lut })
    }

    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    /// The 128-entry lookup table
    pub fn table(&self) -> &[u8; 128] {
        &self.lut
    }

    #[inline]
    pub fn mask(&self, base: u8) -> u8 {
        if base < 128 {
            self.lut[base as usize]
        } else {
            0
        }
    }

    /// True when the base is representable at this ploidy
    #[inline]
    pub fn is_valid(&self, base: u8) -> bool {
        self.mask(base) != 0
    }

    /// Upper-case codes representable at this ploidy
    pub fn valid_bases(&self) -> Vec<u8> {
        IUPAC_BITS
            .iter()
            .filter(|(code, _)| self.is_valid(*code))
            .map(|(code, _)| *code)
            .collect()
    }

    /// Encode a whole base matrix.
    ///
    /// Fails on the first non-ASCII byte or character outside the IUPAC/N/gap
    /// alphabet; valid but unrepresentable codes encode as 0.
    pub fn to_bits(&self, matrix: &SampleMatrix, reporter: &dyn Reporter) -> Result<MaskMatrix> {
        reporter.info("🔢 Converting variants to bits");
        let mut data = Vec::with_capacity(matrix.as_flat().len());
        for (sample, row) in matrix.rows().enumerate() {
            check_row(row, sample)?;
            data.extend(row.iter().map(|&b| self.lut[b as usize]));
        }
        Ok(MaskMatrix::from_flat(matrix.n_samples(), matrix.n_sites(), data))
    }
}
