use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::fixtures::dataset;
use crate::model::{ChangeModel, ModelConfig};
use crate::pipeline::catalog::OutOfRangeError;
use crate::pipeline::mask::CellMask;

fn context() -> AppContext {
    let model = ChangeModel::new(ModelConfig::default().change_params()).unwrap();
    AppContext::new(dataset(true), Box::new(model))
}

fn form(data1: &str, data2: &str, genes: &str) -> SubmitForm {
    SubmitForm {
        data1: Some(data1.to_string()),
        data2: Some(data2.to_string()),
        genes: Some(genes.to_string()),
    }
}

/// Wraps the real model and counts invocations.
struct CountingModel {
    inner: ChangeModel,
    calls: Arc<AtomicUsize>,
}

impl DeModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    fn differential_expression(
        &self,
        dataset: &Dataset,
        group1: &CellMask,
        group2: &CellMask,
    ) -> Result<crate::model::DeTable, ComputationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.differential_expression(dataset, group1, group2)
    }
}

#[test]
fn test_b_cell_versus_t_cell() {
    let ctx = context();
    let report = run_submission(
        &ctx,
        &form(r#"[{"row": 0}]"#, r#"[{"row": 1}]"#, r#""GENE1""#),
    )
    .unwrap();
    assert_eq!(report.title, "B cell versus T cell");
    assert_eq!(report.dejsondata.data.len(), 3);
    assert_eq!(report.dejsondata.columns.len(), 4);
    // GENE1 is the flat gene and sorts last; it is the only highlighted one.
    assert_eq!(report.dejsondata.data[2].gene_name, "GENE1");
    assert!(report.deplothtml.contains(r#""color":["black","black","red"]"#));
}

#[test]
fn test_out_of_range_index_skips_computation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = CountingModel {
        inner: ChangeModel::new(ModelConfig::default().change_params()).unwrap(),
        calls: Arc::clone(&calls),
    };
    let ctx = AppContext::new(dataset(true), Box::new(model));
    let err = run_submission(&ctx, &form(r#"[{"row": 0}]"#, r#"[{"row": 2}]"#, r#""""#))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Selection(SelectionError::OutOfRange(OutOfRangeError {
            index: 2,
            len: 2
        }))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    run_submission(&ctx, &form(r#"[{"row": 0}]"#, r#"[{"row": 1}]"#, r#""""#)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_overlapping_groups_reach_the_model() {
    let ctx = context();
    match run_submission(&ctx, &form(r#"[{"row": 0}]"#, r#"[{"row": 0}]"#, r#""""#)) {
        Ok(report) => assert_eq!(report.title, "B cell versus B cell"),
        Err(err) => assert!(matches!(err, PipelineError::Computation(_))),
    }
}

#[test]
fn test_empty_group_is_computation_error() {
    let ctx = context();
    let err = run_submission(&ctx, &form("[]", r#"[{"row": 1}]"#, r#""""#)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Computation(ComputationError::EmptyGroup { group: 1 })
    ));
}

#[test]
fn test_malformed_submission() {
    let ctx = context();
    let err = run_submission(&ctx, &SubmitForm::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Selection(SelectionError::Malformed(_))
    ));
}
