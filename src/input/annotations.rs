use std::collections::HashMap;
use std::path::Path;

use crate::input::DatasetError;
use crate::input::features::Feature;
use crate::input::reader::{open_maybe_gz, read_line};

pub const NAME_COLUMN: &str = "gene_name";
pub const DESCRIPTION_COLUMN: &str = "gene_description";

/// Per-feature display annotations, aligned to the feature axis.
#[derive(Debug, Clone, Default)]
pub struct GeneAnnotations {
    pub names: Vec<Option<String>>,
    pub descriptions: Vec<Option<String>>,
}

impl GeneAnnotations {
    pub fn name(&self, feature: usize) -> Option<&str> {
        self.names.get(feature).and_then(|v| v.as_deref())
    }

    pub fn description(&self, feature: usize) -> Option<&str> {
        self.descriptions.get(feature).and_then(|v| v.as_deref())
    }
}

/// Loads `var.tsv`. Returns `Ok(None)` when the file lacks either annotation
/// column; the dataset is then treated as unannotated.
pub fn load_annotations(
    path: &Path,
    features: &[Feature],
) -> Result<Option<GeneAnnotations>, DatasetError> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();

    if read_line(&mut reader, &mut buf, path)? == 0 {
        return Ok(None);
    }
    let header: Vec<String> = buf
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();

    let id_col = header.iter().position(|h| h == "gene_id").unwrap_or(0);
    let (Some(name_col), Some(desc_col)) = (
        header.iter().position(|h| h == NAME_COLUMN),
        header.iter().position(|h| h == DESCRIPTION_COLUMN),
    ) else {
        return Ok(None);
    };

    let mut by_id: HashMap<String, (Option<String>, Option<String>)> = HashMap::new();
    while read_line(&mut reader, &mut buf, path)? > 0 {
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(id) = fields.get(id_col).map(|s| s.trim()) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        by_id.entry(id.to_string()).or_insert_with(|| {
            (
                cell_value(fields.get(name_col).copied()),
                cell_value(fields.get(desc_col).copied()),
            )
        });
    }

    let mut names = Vec::with_capacity(features.len());
    let mut descriptions = Vec::with_capacity(features.len());
    for feature in features {
        let (name, description) = by_id.remove(&feature.id).unwrap_or((None, None));
        names.push(name);
        descriptions.push(description);
    }

    Ok(Some(GeneAnnotations {
        names,
        descriptions,
    }))
}

fn cell_value(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(value.to_string())
    }
}
