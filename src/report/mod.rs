pub mod table;
pub mod volcano;

use serde::Serialize;

use crate::input::Dataset;
use crate::model::DeTable;
use crate::pipeline::selection::Selection;

pub use table::{DeTableRow, build_table};
pub use volcano::{VolcanoLabels, build_figure, render_html};

/// Added to `proba_not_de` before taking the log so certain genes stay finite.
pub const PVAL_EPSILON: f64 = 1e-5;
pub const DESCRIPTION_WRAP: usize = 80;
pub const NAME_PLACEHOLDER: &str = "gene name here";
pub const DESCRIPTION_PLACEHOLDER: &str = "gene description here";
pub const MISSING: &str = "-";
pub const COLOR_DEFAULT: &str = "black";
pub const COLOR_SELECTED: &str = "red";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub data: String,
    pub title: String,
}

impl TableColumn {
    pub fn new(data: &str, title: &str) -> Self {
        Self {
            data: data.to_string(),
            title: title.to_string(),
        }
    }
}

/// Rows plus column definitions, the shape the DataTables client expects.
#[derive(Debug, Clone, Serialize)]
pub struct DataTable<T> {
    pub data: Vec<T>,
    pub columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeReport {
    pub deplothtml: String,
    pub dejsondata: DataTable<DeTableRow>,
    pub title: String,
}

/// A DE record joined with its display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub gene_id: String,
    pub gene_name: String,
    pub description_html: String,
    pub lfc_mean: f64,
    pub lfc_std: f64,
    pub minuslog10pval: f64,
    pub color: &'static str,
}

impl DisplayRow {
    pub fn is_selected(&self) -> bool {
        self.color == COLOR_SELECTED
    }
}

/// `-log10(p + 1e-5)`, floored at zero so `p = 1` does not go negative.
pub fn minus_log10_pval(proba_not_de: f64) -> f64 {
    (-(proba_not_de + PVAL_EPSILON).log10()).max(0.0)
}

/// Exact id match, or case-sensitive substring match on a real gene name.
pub fn is_highlighted(gene_id: &str, gene_name: Option<&str>, genes: &[String]) -> bool {
    genes.iter().any(|g| g == gene_id)
        || gene_name.is_some_and(|name| genes.iter().any(|g| name.contains(g.as_str())))
}

pub fn display_rows(dataset: &Dataset, table: &DeTable, genes: &[String]) -> Vec<DisplayRow> {
    let annotations = dataset.annotations.as_ref();
    table
        .records
        .iter()
        .map(|record| {
            let gene_id = dataset.features[record.feature].id.clone();
            let (name, gene_name, description_html) = match annotations {
                Some(ann) => {
                    let name = ann.name(record.feature);
                    let description = ann
                        .description(record.feature)
                        .map(|d| wrap_text(d, DESCRIPTION_WRAP).join("<br>"))
                        .unwrap_or_else(|| MISSING.to_string());
                    (name, name.unwrap_or(MISSING).to_string(), description)
                }
                None => (
                    None,
                    NAME_PLACEHOLDER.to_string(),
                    DESCRIPTION_PLACEHOLDER.to_string(),
                ),
            };
            let color = if is_highlighted(&gene_id, name, genes) {
                COLOR_SELECTED
            } else {
                COLOR_DEFAULT
            };
            DisplayRow {
                minuslog10pval: minus_log10_pval(record.proba_not_de),
                lfc_mean: record.lfc_mean,
                lfc_std: record.lfc_std,
                gene_id,
                gene_name,
                description_html,
                color,
            }
        })
        .collect()
}

pub fn build_report(
    dataset: &Dataset,
    table: &DeTable,
    selection: &Selection,
) -> Result<DeReport, serde_json::Error> {
    let rows = display_rows(dataset, table, &selection.genes);
    let n_selected = rows.iter().filter(|r| r.is_selected()).count();
    tracing::debug!(
        n_rows = rows.len(),
        n_highlighted = n_selected,
        "formatting differential expression results"
    );
    for row in rows.iter().take(5) {
        tracing::debug!(
            gene_id = %row.gene_id,
            gene_name = %row.gene_name,
            minuslog10pval = row.minuslog10pval,
            lfc_mean = row.lfc_mean,
            lfc_std = row.lfc_std,
            "top feature"
        );
    }

    let labels = VolcanoLabels {
        group1: selection.group1.title(),
        group2: selection.group2.title(),
    };
    let figure = build_figure(&rows, &labels);
    let deplothtml = render_html(&figure, "de-volcano")?;

    Ok(DeReport {
        deplothtml,
        dejsondata: build_table(&rows),
        title: selection.title(),
    })
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Greedy word wrap. Lines break at whitespace and after hyphens between
/// alphanumerics (`T-cell` may wrap as `T-` / `cell`); chunks longer than
/// `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        for (i, chunk) in hyphen_chunks(word).into_iter().enumerate() {
            let word_start = i == 0;
            let mut chars: Vec<char> = chunk.chars().collect();
            while chars.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            if chars.is_empty() {
                continue;
            }
            let sep = usize::from(word_start && current_len > 0);
            if current_len > 0 && current_len + sep + chars.len() > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if word_start && current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += chars.len();
            current.extend(chars);
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Splits `word` after every `-` that sits between two alphanumerics.
fn hyphen_chunks(word: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    for i in 1..chars.len().saturating_sub(1) {
        let (pos, c) = chars[i];
        if c == '-' && chars[i - 1].1.is_alphanumeric() && chars[i + 1].1.is_alphanumeric() {
            let end = pos + c.len_utf8();
            chunks.push(&word[start..end]);
            start = end;
        }
    }
    chunks.push(&word[start..]);
    chunks
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
