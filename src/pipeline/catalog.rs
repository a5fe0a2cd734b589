use std::collections::BTreeSet;

use serde::Serialize;

use crate::report::{DataTable, TableColumn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cell type index {index} is out of range (catalog has {len} entries)")]
pub struct OutOfRangeError {
    pub index: i64,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub index: usize,
    pub label: String,
    /// `label` with underscores shown as spaces.
    pub display: String,
}

pub fn display_label(label: &str) -> String {
    label.replace('_', " ")
}

/// Sorted distinct cell-type labels of the dataset. Catalog indices are the
/// row numbers of the selection tables shown to the client.
#[derive(Debug, Clone)]
pub struct CellTypeCatalog {
    labels: Vec<String>,
    /// Catalog index of every cell's label, aligned to the cell axis.
    codes: Vec<u32>,
}

impl CellTypeCatalog {
    pub fn build(cell_types: &[String]) -> Self {
        let labels: Vec<String> = cell_types
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        let codes = cell_types
            .iter()
            .map(|label| {
                let (Ok(idx) | Err(idx)) = labels.binary_search(label);
                idx as u32
            })
            .collect();
        Self { labels, codes }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }

    pub fn lookup(&self, index: i64) -> Result<&str, OutOfRangeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
            .ok_or(OutOfRangeError {
                index,
                len: self.labels.len(),
            })
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.labels
            .iter()
            .enumerate()
            .map(|(index, label)| CatalogEntry {
                index,
                label: label.clone(),
                display: display_label(label),
            })
            .collect()
    }

    /// Payload for the client-side selection tables.
    pub fn to_table(&self) -> DataTable<CatalogEntry> {
        DataTable {
            data: self.entries(),
            columns: vec![TableColumn::new("display", "Cell Type")],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/catalog.rs"]
mod tests;
