use std::collections::HashMap;
use std::path::Path;

use crate::input::DatasetError;
use crate::input::reader::{open_maybe_gz, read_line};

/// Reads the `key` column of a per-cell TSV (header row, one barcode column)
/// and returns it aligned to `barcodes`.
pub fn load_cell_labels(
    path: &Path,
    barcodes: &[String],
    key: &str,
) -> Result<Vec<String>, DatasetError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    if read_line(&mut reader, &mut buf, path)? == 0 {
        return Err(DatasetError::Parse("obs file is empty".to_string()));
    }
    let header: Vec<String> = buf
        .trim_end()
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();

    let barcode_col = header
        .iter()
        .position(|name| {
            let lower = name.to_ascii_lowercase();
            lower == "barcode" || lower == "barcodes" || lower.is_empty()
        })
        .unwrap_or(0);
    let key_col = header.iter().position(|name| name == key).ok_or_else(|| {
        DatasetError::MissingInput(format!("obs file has no '{key}' column"))
    })?;
    if key_col == barcode_col {
        return Err(DatasetError::InvalidInput(format!(
            "obs column '{key}' is also the barcode column"
        )));
    }

    let mut by_barcode: HashMap<String, String> = HashMap::new();
    let mut line_no = 1usize;

    while read_line(&mut reader, &mut buf, path)? > 0 {
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(barcode) = fields.get(barcode_col).map(|s| s.trim()) else {
            tracing::warn!(line = line_no, "obs line has no barcode column; skipping");
            continue;
        };
        if barcode.is_empty() {
            tracing::warn!(line = line_no, "obs line has empty barcode; skipping");
            continue;
        }
        if by_barcode.contains_key(barcode) {
            tracing::warn!(
                line = line_no,
                barcode,
                "duplicate barcode in obs; keeping first"
            );
            continue;
        }
        let label = fields.get(key_col).map(|s| s.trim()).unwrap_or("");
        by_barcode.insert(barcode.to_string(), label.to_string());
    }

    let mut labels = Vec::with_capacity(barcodes.len());
    for bc in barcodes {
        match by_barcode.remove(bc) {
            Some(label) => labels.push(label),
            None => {
                return Err(DatasetError::InvalidInput(format!(
                    "cell {bc} has no '{key}' entry in obs"
                )));
            }
        }
    }

    Ok(labels)
}
