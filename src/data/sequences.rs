// sequences.rs - Aligned FASTA loading for the reference and samples

use crate::error::{PolyCoreError, Result};
use crate::reporter::Reporter;
use bio::io::fasta;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Name given to the first input file
pub const REFERENCE_NAME: &str = "Reference";

/// One input file flattened into a single sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSequence {
    pub name: String,
    pub sequence: Vec<u8>,
    pub n_records: usize,
}

/// Sequences loaded from a set of aligned FASTA files, reference first
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    pub names: Vec<String>,
    pub sequences: Vec<Vec<u8>>,
}

impl SequenceSet {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Alignment length (length of the reference)
    pub fn sequence_length(&self) -> usize {
        self.sequences.first().map(|s| s.len()).unwrap_or(0)
    }
}

/// File stem used as the sample name
fn sample_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| PolyCoreError::Io(format!("Invalid filename: {}", path.display())))
}

/// Read every record of a FASTA file and concatenate them, upper-cased
pub fn read_fasta(path: &Path, name: String) -> Result<LoadedSequence> {
    let file = File::open(path).map_err(|e| {
        PolyCoreError::Io(format!("Failed to open FASTA file {}: {}", path.display(), e))
    })?;
    let reader = fasta::Reader::new(BufReader::new(file));

    let mut sequence = Vec::new();
    let mut n_records = 0;
    for record_result in reader.records() {
        let record = record_result.map_err(|e| {
            PolyCoreError::Io(format!("Invalid FASTA record in {}: {}", path.display(), e))
        })?;
        sequence.extend(record.seq().iter().map(|b| b.to_ascii_uppercase()));
        n_records += 1;
    }

    Ok(LoadedSequence {
        name,
        sequence,
        n_records,
    })
}

/// Load the reference (first path) and samples.
///
/// The reference is named `Reference`; samples take their file stem. Every
/// sample must have the reference's length.
pub fn load_sequences<P: AsRef<Path>>(paths: &[P], reporter: &dyn Reporter) -> Result<SequenceSet> {
    if paths.is_empty() {
        return Err(PolyCoreError::EmptySampleSet);
    }
    reporter.info(&format!("📂 Loading {} FASTA files", paths.len()));
    let pb = reporter.progress_bar(paths.len() as u64, "files");

    let mut set = SequenceSet::default();
    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let name = if i == 0 {
            REFERENCE_NAME.to_string()
        } else {
            sample_name(path)?
        };
        let loaded = read_fasta(path, name)?;
        if loaded.n_records == 0 {
            reporter.warn(&format!("No FASTA records in {}", path.display()));
        }

        let expected = set.sequence_length();
        if i > 0 && loaded.sequence.len() != expected {
            pb.finish_and_clear();
            return Err(PolyCoreError::LengthMismatch {
                name: path.display().to_string(),
                expected,
                found: loaded.sequence.len(),
            });
        }
        set.names.push(loaded.name);
        set.sequences.push(loaded.sequence);
        pb.inc(1);
    }
    pb.finish_and_clear();

    reporter.info(&format!(
        "✅ Loaded {} sequences of length {}",
        set.len(),
        set.sequence_length()
    ));
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::SilentReporter;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("polycore_seq_{}_{}", label, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_sequences_names_and_case() {
        let dir = scratch_dir("names");
        let reference = dir.join("ref.fasta");
        let sample = dir.join("sampleA.fa");
        fs::write(&reference, ">chr1\nACGT\n>chr2\nAC\n").unwrap();
        fs::write(&sample, ">chr1\nacgn\n>chr2\nR-\n").unwrap();

        let set = load_sequences(&[&reference, &sample], &SilentReporter).unwrap();
        assert_eq!(set.names, vec!["Reference", "sampleA"]);
        assert_eq!(set.sequences[0], b"ACGTAC".to_vec());
        assert_eq!(set.sequences[1], b"ACGNR-".to_vec());
        assert_eq!(set.sequence_length(), 6);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_length_mismatch_names_file() {
        let dir = scratch_dir("mismatch");
        let reference = dir.join("ref.fasta");
        let short = dir.join("short.fasta");
        fs::write(&reference, ">r\nACGT\n").unwrap();
        fs::write(&short, ">s\nACG\n").unwrap();

        let err = load_sequences(&[&reference, &short], &SilentReporter).unwrap_err();
        match err {
            PolyCoreError::LengthMismatch { name, expected, found } => {
                assert!(name.ends_with("short.fasta"));
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {}", other),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_and_empty_input() {
        let missing = PathBuf::from("/nonexistent/polycore/ref.fasta");
        assert!(matches!(
            load_sequences(&[&missing], &SilentReporter),
            Err(PolyCoreError::Io(_))
        ));
        let none: Vec<PathBuf> = Vec::new();
        assert_eq!(
            load_sequences(&none, &SilentReporter).unwrap_err(),
            PolyCoreError::EmptySampleSet
        );
    }
}
