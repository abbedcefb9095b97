// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::cli::memory::{detect_available_memory, AvailableMemory};
use crate::core::distance::auto_chunk_size;
use crate::core::pipeline::PipelineParams;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ValidationResult {
    pub params: PipelineParams,
    /// Reference first, then samples in command-line order
    pub inputs: Vec<PathBuf>,
    pub outdir: PathBuf,
    /// Set when the chunk size was derived from available memory
    pub memory: Option<AvailableMemory>,
}

fn check_fraction(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} must be between 0.0 and 1.0 (got {})", name, value));
    }
    Ok(())
}

fn check_input(path: &str) -> Result<PathBuf, String> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("Input FASTA not found: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let reference = args
        .reference
        .as_deref()
        .ok_or_else(|| "--ref is required (reference FASTA)".to_string())?;
    if args.samples.is_empty() {
        return Err("At least one sample FASTA is required".to_string());
    }

    // Validate thresholds
    check_fraction("--min-gf", args.min_gf)?;
    check_fraction("--min-cf", args.min_cf)?;
    check_fraction("--min-pf", args.min_pf)?;

    if args.ploidy == Some(0) {
        return Err("--ploidy must be at least 1".to_string());
    }
    if args.chunk_size == Some(0) {
        return Err("--chunk-size must be at least 1".to_string());
    }
    if args.threads == Some(0) {
        return Err("--threads must be at least 1".to_string());
    }

    let mut inputs = Vec::with_capacity(args.samples.len() + 1);
    inputs.push(check_input(reference)?);
    for sample in &args.samples {
        inputs.push(check_input(sample)?);
    }

    // Upper bound on representatives: collapse can only shrink the set
    let (chunk_size, memory) = match args.chunk_size {
        Some(size) => (size, None),
        None => {
            let memory = detect_available_memory();
            (auto_chunk_size(inputs.len(), memory.bytes), Some(memory))
        }
    };

    let params = PipelineParams {
        min_gf: args.min_gf,
        min_cf: args.min_cf,
        min_pf: args.min_pf,
        min_pn: args.min_pn,
        progressive: args.progressive,
        ploidy: args.ploidy,
        chunk_size,
    };
    params.validate().map_err(String::from)?;

    Ok(ValidationResult {
        params,
        inputs,
        outdir: PathBuf::from(&args.outdir),
        memory,
    })
}
