// mod.rs - Output writers module

pub mod alignment;
pub mod distances;
pub mod report;

use crate::core::pipeline::{PipelineParams, PipelineResult};
use crate::reporter::Reporter;
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

// Re-export main functions for convenience
pub use alignment::{write_fasta, write_vcf};
pub use distances::{write_distances_long, write_distances_wide};
pub use report::{
    write_constant_sites, write_progression, write_progression_plot, write_run_info,
    write_summary, RunInfo,
};

pub const DIST_WIDE_FILE: &str = "dist_wide.csv";
pub const DIST_LONG_FILE: &str = "dist_long.csv";
pub const CORE_FULL_ALN_FILE: &str = "core.full.aln";
pub const CORE_ALN_FILE: &str = "core.aln";
pub const VCF_FILE: &str = "core.vcf";
pub const FCONST_FILE: &str = "fconst.txt";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const PROGRESSION_FILE: &str = "core_fraction_progression.csv";
pub const PLOT_FILE: &str = "core_fraction_plot.html";
pub const RUN_INFO_FILE: &str = "run_info.json";

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<(), String> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|e| {
                format!("Failed to create parent directory '{}': {}", parent.display(), e)
            })?;
        }
    }
    Ok(())
}

/// Buffered writer on a fresh file, parent directories created
fn create_writer(file_path: &Path) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path).map_err(|e| {
        format!("Failed to create output file '{}': {}", file_path.display(), e)
    })?;
    Ok(BufWriter::new(file))
}

/// CSV writer on a fresh file, parent directories created
fn create_csv_writer(file_path: &Path) -> Result<csv::Writer<File>, String> {
    ensure_parent_dir(file_path)?;
    csv::Writer::from_path(file_path).map_err(|e| {
        format!("Failed to create output file '{}': {}", file_path.display(), e)
    })
}

fn saved(reporter: &dyn Reporter, file_path: &Path) {
    reporter.info(&format!("💾 Saved file -> {}", file_path.display()));
}

/// Write every result file of a run into `outdir`; returns the written paths
pub fn write_outputs(
    outdir: &Path,
    result: &PipelineResult,
    params: &PipelineParams,
    reporter: &dyn Reporter,
) -> Result<Vec<PathBuf>, String> {
    create_dir_all(outdir)
        .map_err(|e| format!("Failed to create output directory '{}': {}", outdir.display(), e))?;
    let mut written = Vec::new();

    let path = outdir.join(DIST_WIDE_FILE);
    write_distances_wide(&path, &result.distances_full, reporter)?;
    written.push(path);

    let path = outdir.join(DIST_LONG_FILE);
    write_distances_long(&path, &result.distances_core, reporter)?;
    written.push(path);

    let path = outdir.join(CORE_FULL_ALN_FILE);
    write_fasta(&path, &result.core_alignment, reporter)?;
    written.push(path);

    let path = outdir.join(CORE_ALN_FILE);
    write_fasta(&path, &result.variant_alignment, reporter)?;
    written.push(path);

    let path = outdir.join(VCF_FILE);
    write_vcf(&path, &result.variant_alignment, reporter)?;
    written.push(path);

    let path = outdir.join(FCONST_FILE);
    write_constant_sites(&path, &result.constant, reporter)?;
    written.push(path);

    let path = outdir.join(SUMMARY_FILE);
    write_summary(&path, &result.summary, reporter)?;
    written.push(path);

    if params.progressive {
        let path = outdir.join(PROGRESSION_FILE);
        write_progression(&path, &result.progression, reporter)?;
        written.push(path);

        let path = outdir.join(PLOT_FILE);
        if write_progression_plot(&path, &result.progression, reporter)? {
            written.push(path);
        }
    }

    let path = outdir.join(RUN_INFO_FILE);
    write_run_info(&path, &RunInfo::new(result, params), reporter)?;
    written.push(path);

    Ok(written)
}
