use std::collections::BTreeSet;

use serde::Deserialize;

use crate::pipeline::catalog::{CellTypeCatalog, OutOfRangeError, display_label};
use crate::pipeline::mask::CellMask;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRangeError),
    #[error("malformed submission: {0}")]
    Malformed(String),
}

/// Raw form fields as posted by the landing page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitForm {
    pub data1: Option<String>,
    pub data2: Option<String>,
    pub genes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SelectedRow {
    row: i64,
}

/// Accepts both `[{row}, ...]` and the DataTables export shape
/// `[[{row}, ...], ...]`, of which only the first element is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SelectionPayload {
    Flat(Vec<SelectedRow>),
    Nested(Vec<Vec<SelectedRow>>),
}

impl SelectionPayload {
    fn into_indices(self) -> Vec<i64> {
        let rows = match self {
            SelectionPayload::Flat(rows) => rows,
            SelectionPayload::Nested(groups) => groups.into_iter().next().unwrap_or_default(),
        };
        rows.into_iter().map(|r| r.row).collect()
    }
}

/// A parsed submission: catalog indices per group plus the gene list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub group1: Vec<i64>,
    pub group2: Vec<i64>,
    pub genes: Vec<String>,
}

impl Submission {
    pub fn parse(form: &SubmitForm) -> Result<Self, SelectionError> {
        Ok(Self {
            group1: parse_group("data1", form.data1.as_deref())?,
            group2: parse_group("data2", form.data2.as_deref())?,
            genes: parse_genes(form.genes.as_deref())?,
        })
    }
}

fn parse_group(field: &str, raw: Option<&str>) -> Result<Vec<i64>, SelectionError> {
    let raw = raw.ok_or_else(|| SelectionError::Malformed(format!("missing field {field}")))?;
    let payload: SelectionPayload = serde_json::from_str(raw)
        .map_err(|e| SelectionError::Malformed(format!("field {field}: {e}")))?;
    Ok(payload.into_indices())
}

/// The `genes` field is a JSON-encoded string; absent means no highlighting.
pub fn parse_genes(raw: Option<&str>) -> Result<Vec<String>, SelectionError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let text: String = serde_json::from_str(raw)
        .map_err(|e| SelectionError::Malformed(format!("field genes: {e}")))?;
    Ok(normalize_genes(&text))
}

/// Splits on newlines and commas, trims, drops empty entries.
pub fn normalize_genes(text: &str) -> Vec<String> {
    text.split(['\n', '\r', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    /// Selected labels in first-selection order, without duplicates.
    pub labels: Vec<String>,
    pub mask: CellMask,
}

impl ResolvedGroup {
    /// Labels as shown in the selection tables, comma separated.
    pub fn title(&self) -> String {
        self.labels
            .iter()
            .map(|l| display_label(l))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub group1: ResolvedGroup,
    pub group2: ResolvedGroup,
    pub genes: Vec<String>,
}

impl Selection {
    pub fn title(&self) -> String {
        format!("{} versus {}", self.group1.title(), self.group2.title())
    }
}

pub fn resolve_group(
    catalog: &CellTypeCatalog,
    indices: &[i64],
) -> Result<ResolvedGroup, OutOfRangeError> {
    let mut labels = Vec::new();
    let mut codes = BTreeSet::new();
    for &index in indices {
        let label = catalog.lookup(index)?;
        // lookup succeeded, so the index is a valid code
        if codes.insert(index as u32) {
            labels.push(label.to_string());
        }
    }
    let mask = if codes.is_empty() {
        CellMask::none(catalog.codes().len())
    } else {
        CellMask::from_codes(catalog.codes(), &codes)
    };
    Ok(ResolvedGroup { labels, mask })
}

/// Resolves both groups before anything else runs, so one bad index rejects
/// the whole submission.
pub fn resolve(
    catalog: &CellTypeCatalog,
    submission: Submission,
) -> Result<Selection, SelectionError> {
    let group1 = resolve_group(catalog, &submission.group1)?;
    let group2 = resolve_group(catalog, &submission.group2)?;
    Ok(Selection {
        group1,
        group2,
        genes: submission.genes,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/selection.rs"]
mod tests;
