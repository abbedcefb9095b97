// error.rs - Error types shared by the library stages

use std::fmt::{self, Display};

/// Fatal input errors. Degenerate-but-valid inputs (no variant sites, every
/// sample removed by QC) are not errors and yield empty results instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PolyCoreError {
    /// No sequences were supplied
    EmptySampleSet,
    /// Sequence names and sequences have different lengths
    NameCountMismatch { names: usize, sequences: usize },
    /// A sample's length differs from the reference
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Byte outside the ASCII range found while encoding
    NonAscii { byte: u8, sample: usize, site: usize },
    /// ASCII character outside the IUPAC alphabet found while encoding
    InvalidCharacter {
        character: char,
        sample: usize,
        site: usize,
    },
    InvalidChunkSize(usize),
    InvalidPloidy(usize),
    InvalidThreshold { name: &'static str, value: f64 },
    Io(String),
}

impl Display for PolyCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolyCoreError::EmptySampleSet => write!(f, "No sequences to analyse (empty sample set)"),
            PolyCoreError::NameCountMismatch { names, sequences } => write!(
                f,
                "Got {} sample names for {} sequences",
                names, sequences
            ),
            PolyCoreError::LengthMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Sample length ({}) differs from the reference ({}): {}",
                found, expected, name
            ),
            PolyCoreError::NonAscii { byte, sample, site } => write!(
                f,
                "Non-ASCII byte 0x{:02X} in sample {} at site {}. Please sanitize the FASTA to ASCII IUPAC letters and '-' only",
                byte,
                sample,
                site + 1
            ),
            PolyCoreError::InvalidCharacter {
                character,
                sample,
                site,
            } => write!(
                f,
                "Unrecognized character {:?} in sample {} at site {} (expected IUPAC letters, N or '-')",
                character,
                sample,
                site + 1
            ),
            PolyCoreError::InvalidChunkSize(size) => {
                write!(f, "Chunk size must be a positive number of sites (got {})", size)
            }
            PolyCoreError::InvalidPloidy(ploidy) => {
                write!(f, "Ploidy must be at least 1 (got {})", ploidy)
            }
            PolyCoreError::InvalidThreshold { name, value } => {
                write!(f, "{} must be between 0.0 and 1.0 (got {})", name, value)
            }
            PolyCoreError::Io(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for PolyCoreError {}

impl From<PolyCoreError> for String {
    fn from(err: PolyCoreError) -> Self {
        err.to_string()
    }
}

impl From<std::io::Error> for PolyCoreError {
    fn from(err: std::io::Error) -> Self {
        PolyCoreError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PolyCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PolyCoreError::LengthMismatch {
            name: "sample.fa".to_string(),
            expected: 10,
            found: 9,
        };
        assert!(err.to_string().contains("sample.fa"));

        let err = PolyCoreError::NonAscii {
            byte: 0xC3,
            sample: 1,
            site: 0,
        };
        let message: String = err.into();
        assert!(message.contains("0xC3"));
        assert!(message.contains("site 1"));
    }
}
