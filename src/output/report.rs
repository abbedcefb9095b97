// report.rs - Summary tables, constant sites, progression plot and run metadata

use super::{create_csv_writer, create_writer, saved};
use crate::core::pipeline::{PipelineParams, PipelineResult, SampleSummary, SiteCounts};
use crate::core::variants::ConstantSites;
use crate::reporter::Reporter;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const PLOT_WIDTH: f64 = 900.0;
const PLOT_HEIGHT: f64 = 520.0;
const PLOT_MARGIN: f64 = 60.0;

fn fraction(value: f64) -> String {
    format!("{:.6}", value)
}

/// Single `A,C,G,T` line
pub fn write_constant_sites(
    file_path: &Path,
    constant: &ConstantSites,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    writeln!(writer, "{}", constant.to_line()).map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}

/// Per-sample summary; `NA` marks values of samples removed by QC
pub fn write_summary(
    file_path: &Path,
    rows: &[SampleSummary],
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_csv_writer(file_path)?;
    writer
        .write_record([
            "name",
            "length",
            "missing",
            "genome_fraction",
            "core_fraction",
            "variants",
        ])
        .map_err(|e| format!("Write error: {}", e))?;

    for row in rows {
        writer
            .write_record([
                row.name.clone(),
                row.length.to_string(),
                row.missing.to_string(),
                fraction(row.genome_fraction),
                row.core_fraction.map(fraction).unwrap_or_else(|| "NA".to_string()),
                row.variants
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "NA".to_string()),
            ])
            .map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}

/// `step,sample,core_fraction` in addition order
pub fn write_progression(
    file_path: &Path,
    progression: &[(String, f64)],
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_csv_writer(file_path)?;
    writer
        .write_record(["step", "sample", "core_fraction"])
        .map_err(|e| format!("Write error: {}", e))?;
    for (step, (name, core_fraction)) in progression.iter().enumerate() {
        writer
            .write_record([(step + 1).to_string(), name.clone(), fraction(*core_fraction)])
            .map_err(|e| format!("Write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone HTML page with an inline SVG line plot of the trajectory
fn render_plot(progression: &[(String, f64)]) -> String {
    let inner_w = PLOT_WIDTH - 2.0 * PLOT_MARGIN;
    let inner_h = PLOT_HEIGHT - 2.0 * PLOT_MARGIN;
    let steps = progression.len().max(2) - 1;
    let x = |i: usize| PLOT_MARGIN + inner_w * i as f64 / steps as f64;
    let y = |cf: f64| PLOT_MARGIN + inner_h * (1.0 - cf.clamp(0.0, 1.0));

    let points: Vec<String> = progression
        .iter()
        .enumerate()
        .map(|(i, (_, cf))| format!("{:.1},{:.1}", x(i), y(*cf)))
        .collect();

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = PLOT_WIDTH,
        h = PLOT_HEIGHT
    ));
    svg.push_str(&format!(
        "  <line x1=\"{m}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#444\"/>\n  <line x1=\"{m}\" y1=\"{m}\" x2=\"{m}\" y2=\"{b}\" stroke=\"#444\"/>\n",
        m = PLOT_MARGIN,
        b = PLOT_HEIGHT - PLOT_MARGIN,
        r = PLOT_WIDTH - PLOT_MARGIN
    ));
    for tick in 0..=4 {
        let value = tick as f64 / 4.0;
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{:.2}</text>\n",
            PLOT_MARGIN - 6.0,
            y(value) + 4.0,
            value
        ));
    }
    svg.push_str(&format!(
        "  <polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"2\" points=\"{}\"/>\n",
        points.join(" ")
    ));
    for (i, (name, cf)) in progression.iter().enumerate() {
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"#1f77b4\"><title>{}\nOrder: {}\nCore Fraction: {:.3}</title></circle>\n",
            x(i),
            y(*cf),
            escape_html(name),
            i + 1,
            cf
        ));
    }
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\">Number of sequences included</text>\n",
        PLOT_WIDTH / 2.0,
        PLOT_HEIGHT - 15.0
    ));
    svg.push_str(&format!(
        "  <text x=\"15\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" transform=\"rotate(-90 15 {:.1})\">Soft-core Genome Fraction</text>\n",
        PLOT_HEIGHT / 2.0,
        PLOT_HEIGHT / 2.0
    ));
    svg.push_str("</svg>\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Soft-core Genome Fraction vs Sample Addition</title>\n</head>\n<body>\n<h2>Soft-core Genome Fraction vs Sample Addition</h2>\n{}</body>\n</html>\n",
        svg
    )
}

/// Write the progression plot; `Ok(false)` when there is nothing to plot
pub fn write_progression_plot(
    file_path: &Path,
    progression: &[(String, f64)],
    reporter: &dyn Reporter,
) -> Result<bool, String> {
    reporter.info("📈 Creating progressive core plot");
    let (first, last) = match (progression.first(), progression.last()) {
        (Some(first), Some(last)) => (first.1, last.1),
        _ => {
            reporter.info("ℹ️  No progression data for plotting");
            return Ok(false);
        }
    };

    let mut writer = create_writer(file_path)?;
    writer
        .write_all(render_plot(progression).as_bytes())
        .map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    reporter.info(&format!(
        "📈 Progression from {:.3} to {:.3}",
        first, last
    ));
    Ok(true)
}

/// Run metadata written next to the results
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub version: String,
    pub timestamp: String,
    pub parameters: PipelineParams,
    pub ploidy: usize,
    pub samples: usize,
    pub representatives: usize,
    pub kept_representatives: usize,
    pub sites: SiteCounts,
    pub core_fraction: f64,
}

impl RunInfo {
    pub fn new(result: &PipelineResult, params: &PipelineParams) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            parameters: params.clone(),
            ploidy: result.ploidy,
            samples: result.n_samples(),
            representatives: result.n_representatives(),
            kept_representatives: result.n_kept_representatives(),
            sites: result.sites,
            core_fraction: result.core_fraction,
        }
    }
}

pub fn write_run_info(
    file_path: &Path,
    info: &RunInfo,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    serde_json::to_writer_pretty(&mut writer, info)
        .map_err(|e| format!("Failed to serialize run info: {}", e))?;
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}
