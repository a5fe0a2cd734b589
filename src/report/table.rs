use serde::Serialize;

use crate::report::{DataTable, DisplayRow, MISSING, TableColumn, round_to};

pub const COL_GENE_ID: &str = "Gene ID";
pub const COL_GENE_NAME: &str = "Gene Name";
pub const COL_PVAL: &str = "-log10 p-value";
pub const COL_LFC: &str = "mean log2 fold change";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableValue {
    Number(f64),
    Text(String),
}

impl TableValue {
    /// Rounded to two decimals; non-finite values render as a dash.
    pub fn rounded(value: f64) -> Self {
        if value.is_finite() {
            TableValue::Number(round_to(value, 2))
        } else {
            TableValue::Text(MISSING.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeTableRow {
    #[serde(rename = "Gene ID")]
    pub gene_id: String,
    #[serde(rename = "Gene Name")]
    pub gene_name: String,
    #[serde(rename = "-log10 p-value")]
    pub minuslog10pval: TableValue,
    #[serde(rename = "mean log2 fold change")]
    pub lfc_mean: TableValue,
}

pub fn build_table(rows: &[DisplayRow]) -> DataTable<DeTableRow> {
    let data = rows
        .iter()
        .map(|r| DeTableRow {
            gene_id: non_empty_or_dash(&r.gene_id),
            gene_name: non_empty_or_dash(&r.gene_name),
            minuslog10pval: TableValue::rounded(r.minuslog10pval),
            lfc_mean: TableValue::rounded(r.lfc_mean),
        })
        .collect();
    let columns = [COL_GENE_ID, COL_GENE_NAME, COL_PVAL, COL_LFC]
        .into_iter()
        .map(|c| TableColumn::new(c, c))
        .collect();
    DataTable { data, columns }
}

fn non_empty_or_dash(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}
