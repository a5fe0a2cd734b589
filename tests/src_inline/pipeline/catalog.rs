use super::*;

fn labels(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_labels_sorted_and_unique() {
    let catalog = CellTypeCatalog::build(&labels(&["T cell", "B cell", "T cell", "NK cell"]));
    assert_eq!(catalog.labels(), &labels(&["B cell", "NK cell", "T cell"])[..]);
    assert_eq!(catalog.codes(), &[2, 0, 2, 1]);
    assert_eq!(catalog.len(), 3);
}

#[test]
fn test_lookup_in_and_out_of_range() {
    let catalog = CellTypeCatalog::build(&labels(&["T cell", "B cell"]));
    assert_eq!(catalog.lookup(0).unwrap(), "B cell");
    assert_eq!(catalog.lookup(1).unwrap(), "T cell");
    assert_eq!(
        catalog.lookup(2).unwrap_err(),
        OutOfRangeError { index: 2, len: 2 }
    );
    assert!(catalog.lookup(-1).is_err());
}

#[test]
fn test_lookup_resolves_every_valid_index() {
    let raw: Vec<String> = (0..25).rev().map(|i| format!("type_{i:02}")).collect();
    let catalog = CellTypeCatalog::build(&raw);
    let n = catalog.len() as i64;
    for i in 0..n {
        assert!(catalog.lookup(i).is_ok());
    }
    for i in [n, n + 1, i64::MAX, i64::MIN] {
        assert!(catalog.lookup(i).is_err());
    }
}

#[test]
fn test_empty_catalog() {
    let catalog = CellTypeCatalog::build(&[]);
    assert!(catalog.is_empty());
    assert!(catalog.lookup(0).is_err());
}

#[test]
fn test_table_json_shape() {
    let catalog = CellTypeCatalog::build(&labels(&["T cell", "B cell"]));
    let json = serde_json::to_value(catalog.to_table()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "data": [
                {"index": 0, "label": "B cell", "display": "B cell"},
                {"index": 1, "label": "T cell", "display": "T cell"}
            ],
            "columns": [{"data": "display", "title": "Cell Type"}]
        })
    );
}

#[test]
fn test_underscores_shown_as_spaces() {
    let catalog = CellTypeCatalog::build(&labels(&["CD4_T_cell", "B_cell", "NK cell"]));
    let entries = catalog.entries();
    assert_eq!(entries[0].label, "B_cell");
    assert_eq!(entries[0].display, "B cell");
    assert_eq!(entries[1].label, "CD4_T_cell");
    assert_eq!(entries[1].display, "CD4 T cell");
    assert_eq!(entries[2].display, "NK cell");
    // Lookups and masks still use the raw label.
    assert_eq!(catalog.lookup(1).unwrap(), "CD4_T_cell");
    let json = serde_json::to_value(catalog.to_table()).unwrap();
    assert_eq!(json["data"][1]["display"], "CD4 T cell");
    assert_eq!(json["data"][1]["label"], "CD4_T_cell");
}
