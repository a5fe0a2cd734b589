use std::path::Path;

use crate::input::DatasetError;
use crate::input::reader::{open_maybe_gz, read_line};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: String,
    pub symbol: String,
    pub feature_type: Option<String>,
}

/// Parses a 10x `features.tsv` (v3, three columns) or `genes.tsv` (v2, two
/// columns). A single-column file is accepted and uses the id as symbol.
pub fn parse_features(path: &Path) -> Result<Vec<Feature>, DatasetError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut features = Vec::new();
    let mut line_no = 0usize;

    while read_line(&mut reader, &mut buf, path)? > 0 {
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        let id = cols[0].trim();
        if id.is_empty() {
            return Err(DatasetError::Parse(format!(
                "features line {line_no} has an empty feature id"
            )));
        }
        let symbol = cols.get(1).map(|s| s.trim()).unwrap_or(id);
        let feature_type = cols.get(2).map(|s| s.trim().to_string());
        features.push(Feature {
            id: id.to_string(),
            symbol: symbol.to_string(),
            feature_type,
        });
    }

    if features.is_empty() {
        return Err(DatasetError::Parse("features file is empty".to_string()));
    }

    Ok(features)
}
