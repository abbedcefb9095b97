// distances.rs - Wide and long CSV distance matrices

use super::{create_csv_writer, saved};
use crate::core::pipeline::NamedDistances;
use crate::reporter::Reporter;
use std::path::Path;

fn cell(value: Option<u64>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// `name,<names>` header, one row per sample; missing cells are empty
pub fn write_distances_wide(
    file_path: &Path,
    distances: &NamedDistances,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_csv_writer(file_path)?;

    let mut header = Vec::with_capacity(distances.len() + 1);
    header.push("name".to_string());
    header.extend(distances.names.iter().cloned());
    writer
        .write_record(&header)
        .map_err(|e| format!("Write error: {}", e))?;

    for (name, row) in distances.names.iter().zip(&distances.values) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(name.clone());
        record.extend(row.iter().map(|&d| cell(d)));
        writer
            .write_record(&record)
            .map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    Ok(())
}

/// `sample1,sample2,diff` for every unordered pair
pub fn write_distances_long(
    file_path: &Path,
    distances: &NamedDistances,
    reporter: &dyn Reporter,
) -> Result<(), String> {
    let mut writer = create_csv_writer(file_path)?;
    writer
        .write_record(["sample1", "sample2", "diff"])
        .map_err(|e| format!("Write error: {}", e))?;

    let n = distances.len();
    let mut n_pairs = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            writer
                .write_record([
                    distances.names[i].as_str(),
                    distances.names[j].as_str(),
                    cell(distances.values[i][j]).as_str(),
                ])
                .map_err(|e| format!("Write error: {}", e))?;
            n_pairs += 1;
        }
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    saved(reporter, file_path);
    reporter.info(&format!("📐 Distance matrices: {} pairwise comparisons", n_pairs));
    Ok(())
}
