use std::collections::BTreeMap;
use std::path::Path;

use crate::input::DatasetError;
use crate::input::reader::{open_maybe_gz, read_line};

/// Counts stored column-major: one sparse column per cell holding
/// `(feature index, count)` pairs sorted by feature.
#[derive(Debug, Clone)]
pub struct CountMatrix {
    pub n_features: usize,
    pub cols: Vec<Vec<(u32, f32)>>,
    pub libsizes: Vec<f64>,
}

impl CountMatrix {
    pub fn from_columns(n_features: usize, cols: Vec<Vec<(u32, f32)>>) -> Self {
        let libsizes = cols
            .iter()
            .map(|col| col.iter().map(|&(_, v)| v as f64).sum())
            .collect();
        Self {
            n_features,
            cols,
            libsizes,
        }
    }

    pub fn n_cells(&self) -> usize {
        self.cols.len()
    }
}

/// Reads a MatrixMarket coordinate file laid out features x cells, as written
/// by Cell Ranger.
pub fn read_mtx(
    path: &Path,
    n_features: usize,
    n_cells: usize,
) -> Result<CountMatrix, DatasetError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    if read_line(&mut reader, &mut buf, path)? == 0 {
        return Err(DatasetError::Parse("matrix.mtx is empty".to_string()));
    }
    if !buf.starts_with("%%MatrixMarket") {
        return Err(DatasetError::Parse("missing MatrixMarket header".to_string()));
    }
    let header = buf.to_ascii_lowercase();
    if !header.contains("coordinate") {
        return Err(DatasetError::Parse(
            "only coordinate MatrixMarket files are supported".to_string(),
        ));
    }

    // Skip comments to the size line.
    let (rows, cols) = loop {
        if read_line(&mut reader, &mut buf, path)? == 0 {
            return Err(DatasetError::Parse("missing matrix size line".to_string()));
        }
        let line = buf.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(DatasetError::Parse("invalid matrix size line".to_string()));
        }
        let rows = parse_index(parts[0], "row count")?;
        let cols = parse_index(parts[1], "column count")?;
        break (rows, cols);
    };

    if rows != n_features {
        return Err(DatasetError::InvalidInput(format!(
            "matrix row count {rows} does not match features {n_features}"
        )));
    }
    if cols != n_cells {
        return Err(DatasetError::InvalidInput(format!(
            "matrix column count {cols} does not match barcodes {n_cells}"
        )));
    }

    let mut per_col: Vec<BTreeMap<u32, f32>> = vec![BTreeMap::new(); cols];
    let mut line_no = 0usize;

    while read_line(&mut reader, &mut buf, path)? > 0 {
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(DatasetError::Parse(format!(
                "invalid matrix entry at line {line_no}"
            )));
        }
        let row = parse_index(parts[0], "row index")?;
        let col = parse_index(parts[1], "column index")?;
        let val: f32 = parts[2]
            .parse()
            .map_err(|_| DatasetError::Parse(format!("invalid value at line {line_no}")))?;
        if row == 0 || row > rows || col == 0 || col > cols {
            return Err(DatasetError::Parse(format!(
                "matrix entry out of bounds at line {line_no}"
            )));
        }
        if !val.is_finite() || val < 0.0 {
            return Err(DatasetError::InvalidInput(format!(
                "negative or non-finite count at line {line_no}"
            )));
        }
        if val == 0.0 {
            continue;
        }
        *per_col[col - 1].entry((row - 1) as u32).or_insert(0.0) += val;
    }

    let cols = per_col
        .into_iter()
        .map(|map| map.into_iter().collect::<Vec<_>>())
        .collect();

    Ok(CountMatrix::from_columns(rows, cols))
}

fn parse_index(raw: &str, what: &str) -> Result<usize, DatasetError> {
    raw.parse()
        .map_err(|_| DatasetError::Parse(format!("invalid {what}: {raw}")))
}
