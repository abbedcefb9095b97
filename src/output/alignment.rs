// alignment.rs - FASTA alignments and the variant-site VCF

use super::{create_writer, saved};
use crate::core::pipeline::NamedAlignment;
use crate::data::matrix::MISSING_BASE;
use crate::reporter::Reporter;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// One `>name` / sequence pair per sample
pub fn write_fasta(
    file_path: &Path,
    alignment: &NamedAlignment,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    if alignment.names.len() != alignment.sequences.len() {
        return Err("Number of names must match number of sequences".to_string());
    }
    let mut writer = create_writer(file_path)?;
    for (name, sequence) in alignment.names.iter().zip(&alignment.sequences) {
        writeln!(writer, ">{}\n{}", name, sequence).map_err(|e| format!("Write error: {}", e))?;
    }
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}

fn is_missing(base: u8) -> bool {
    base == MISSING_BASE || base == b'-'
}

/// REF, ALT column and genotype row for one site; the first row is the reference
fn site_record(column: &[u8]) -> (u8, String, Vec<String>) {
    let reference = column[0];
    let alts: Vec<u8> = column
        .iter()
        .copied()
        .filter(|&b| b != reference && !is_missing(b))
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .collect();

    let alt = if alts.is_empty() {
        ".".to_string()
    } else {
        alts.iter()
            .map(|&b| (b as char).to_string())
            .collect::<Vec<_>>()
            .join(",")
    };

    let genotypes = column
        .iter()
        .map(|&b| {
            if is_missing(b) {
                ".".to_string()
            } else if b == reference {
                "0".to_string()
            } else {
                let k = alts.iter().position(|&a| a == b).map(|p| p + 1).unwrap_or(0);
                k.to_string()
            }
        })
        .collect();

    (reference, alt, genotypes)
}

/// VCFv4.1 with one record per variant site, haploid-style GT calls
pub fn write_vcf(
    file_path: &Path,
    alignment: &NamedAlignment,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let n_sites = alignment.width();
    let mut writer = create_writer(file_path)?;
    let w = |e: std::io::Error| format!("Write error: {}", e);

    writeln!(writer, "##fileformat=VCFv4.1").map_err(w)?;
    writeln!(writer, "##contig=<ID=1,length={}>", n_sites).map_err(w)?;
    writeln!(
        writer,
        "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
    )
    .map_err(w)?;
    write!(writer, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT").map_err(w)?;
    for name in &alignment.names {
        write!(writer, "\t{}", name).map_err(w)?;
    }
    writeln!(writer).map_err(w)?;

    if !alignment.is_empty() {
        let rows: Vec<&[u8]> = alignment.sequences.iter().map(|s| s.as_bytes()).collect();
        let mut column = vec![0u8; rows.len()];
        for pos in 0..n_sites {
            for (slot, row) in column.iter_mut().zip(&rows) {
                *slot = row[pos];
            }
            let (reference, alt, genotypes) = site_record(&column);
            writeln!(
                writer,
                "1\t{}\t.\t{}\t{}\t.\t.\t.\tGT\t{}",
                pos + 1,
                reference as char,
                alt,
                genotypes.join("\t")
            )
            .map_err(w)?;
        }
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}
