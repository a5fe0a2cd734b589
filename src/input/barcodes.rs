use std::collections::HashSet;
use std::path::Path;

use crate::input::DatasetError;
use crate::input::reader::{open_maybe_gz, read_line};

pub fn parse_barcodes(path: &Path) -> Result<Vec<String>, DatasetError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut barcodes = Vec::new();
    let mut seen = HashSet::new();

    while read_line(&mut reader, &mut buf, path)? > 0 {
        let barcode = buf.trim();
        if barcode.is_empty() {
            continue;
        }
        if !seen.insert(barcode.to_string()) {
            return Err(DatasetError::InvalidInput(format!(
                "duplicate barcode {barcode}"
            )));
        }
        barcodes.push(barcode.to_string());
    }

    if barcodes.is_empty() {
        return Err(DatasetError::Parse("barcodes file is empty".to_string()));
    }

    Ok(barcodes)
}
