use super::*;
use crate::fixtures::CELL_TYPES;

fn catalog() -> CellTypeCatalog {
    let cell_types: Vec<String> = CELL_TYPES.iter().map(|s| s.to_string()).collect();
    CellTypeCatalog::build(&cell_types)
}

fn form(data1: &str, data2: &str, genes: Option<&str>) -> SubmitForm {
    SubmitForm {
        data1: Some(data1.to_string()),
        data2: Some(data2.to_string()),
        genes: genes.map(str::to_string),
    }
}

#[test]
fn test_parse_flat_and_nested_payloads() {
    let flat = Submission::parse(&form(
        r#"[{"row": 0, "column": 0}, {"row": 1}]"#,
        "[]",
        None,
    ))
    .unwrap();
    assert_eq!(flat.group1, vec![0, 1]);
    assert!(flat.group2.is_empty());
    assert!(flat.genes.is_empty());

    let nested = Submission::parse(&form(
        r#"[[{"row": 1, "column": 0}], [{"row": 0}]]"#,
        r#"[[]]"#,
        None,
    ))
    .unwrap();
    assert_eq!(nested.group1, vec![1]);
    assert!(nested.group2.is_empty());
}

#[test]
fn test_parse_rejects_missing_and_malformed_fields() {
    let missing = SubmitForm {
        data1: Some("[]".to_string()),
        ..SubmitForm::default()
    };
    assert!(matches!(
        Submission::parse(&missing),
        Err(SelectionError::Malformed(_))
    ));
    assert!(matches!(
        Submission::parse(&form("not json", "[]", None)),
        Err(SelectionError::Malformed(_))
    ));
    assert!(matches!(
        Submission::parse(&form(r#"[{"row": 1.5}]"#, "[]", None)),
        Err(SelectionError::Malformed(_))
    ));
    assert!(matches!(
        Submission::parse(&form("[]", "[]", Some("GENE1"))),
        Err(SelectionError::Malformed(_))
    ));
}

#[test]
fn test_gene_text_normalization() {
    let genes = parse_genes(Some(r#"" GENE1\nCD3E, MS4\r\n\n,  ""#)).unwrap();
    assert_eq!(genes, vec!["GENE1", "CD3E", "MS4"]);
    assert!(parse_genes(Some(r#""""#)).unwrap().is_empty());
    assert!(parse_genes(Some("")).unwrap().is_empty());
    assert!(parse_genes(None).unwrap().is_empty());
}

#[test]
fn test_masks_for_b_versus_t() {
    let submission = Submission::parse(&form(
        r#"[{"row": 0}]"#,
        r#"[{"row": 1}]"#,
        Some(r#""GENE1""#),
    ))
    .unwrap();
    let selection = resolve(&catalog(), submission).unwrap();

    let expect_b: Vec<bool> = CELL_TYPES.iter().map(|c| *c == "B cell").collect();
    let expect_t: Vec<bool> = CELL_TYPES.iter().map(|c| *c == "T cell").collect();
    assert_eq!(selection.group1.mask, CellMask::from(expect_b));
    assert_eq!(selection.group2.mask, CellMask::from(expect_t));
    assert_eq!(selection.title(), "B cell versus T cell");
    assert_eq!(selection.genes, vec!["GENE1"]);
}

#[test]
fn test_mask_invariant_under_reorder_and_duplicates() {
    let catalog = catalog();
    let a = resolve_group(&catalog, &[0, 1]).unwrap();
    let b = resolve_group(&catalog, &[1, 0, 1, 1, 0]).unwrap();
    assert_eq!(a.mask, b.mask);
    assert_eq!(a.mask.count_selected(), CELL_TYPES.len());
    assert_eq!(b.labels, vec!["T cell", "B cell"]);
    assert_eq!(b.title(), "T cell, B cell");
}

#[test]
fn test_empty_group_yields_all_false_mask() {
    let group = resolve_group(&catalog(), &[]).unwrap();
    assert_eq!(group.mask.len(), CELL_TYPES.len());
    assert_eq!(group.mask.count_selected(), 0);
    assert!(group.labels.is_empty());
}

#[test]
fn test_out_of_range_index_rejects_submission() {
    let submission = Submission::parse(&form(r#"[{"row": 0}]"#, r#"[{"row": 2}]"#, None)).unwrap();
    let err = resolve(&catalog(), submission).unwrap_err();
    assert!(matches!(
        err,
        SelectionError::OutOfRange(OutOfRangeError { index: 2, len: 2 })
    ));
}

#[test]
fn test_overlapping_groups_produce_identical_masks() {
    let submission = Submission::parse(&form(r#"[{"row": 0}]"#, r#"[{"row": 0}]"#, None)).unwrap();
    let selection = resolve(&catalog(), submission).unwrap();
    assert_eq!(selection.group1.mask, selection.group2.mask);
    assert_eq!(selection.title(), "B cell versus B cell");
}

#[test]
fn test_title_uses_display_labels() {
    let raw: Vec<String> = ["CD4_T_cell", "B_cell"].iter().map(|s| s.to_string()).collect();
    let catalog = CellTypeCatalog::build(&raw);
    let group = resolve_group(&catalog, &[1, 0]).unwrap();
    assert_eq!(group.labels, vec!["CD4_T_cell", "B_cell"]);
    assert_eq!(group.title(), "CD4 T cell, B cell");
    assert_eq!(group.mask, CellMask::from(vec![true, true]));
}
