//! Change-mode differential expression on log-normalized expression.
//!
//! For every feature the log2 fold change between the two groups is treated
//! as `Normal(lfc_mean, lfc_std)`, and a feature counts as not differentially
//! expressed when `|lfc| <= delta`. `proba_not_de` is the mass of that
//! interval.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::input::Dataset;
use crate::model::{ComputationError, DeModel, DeRecord, DeTable, ModelLoadError};
use crate::pipeline::mask::CellMask;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeParams {
    pub delta: f64,
    pub scale: f64,
    pub pseudocount: f64,
}

pub struct ChangeModel {
    params: ChangeParams,
    standard: Normal,
}

/// Per-feature accumulators over one group, relative to the zero-count
/// baseline so sparse columns can be summed directly.
#[derive(Debug, Clone)]
pub(crate) struct GroupStats {
    pub n: usize,
    pub baseline: f64,
    pub sum: Vec<f64>,
    pub sum_sq: Vec<f64>,
}

impl GroupStats {
    pub fn mean(&self, feature: usize) -> f64 {
        self.baseline + self.sum[feature] / self.n as f64
    }

    /// Sample variance; zero for a single cell.
    pub fn variance(&self, feature: usize) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let n = self.n as f64;
        let mean_shift = self.sum[feature] / n;
        let ss = self.sum_sq[feature] - n * mean_shift * mean_shift;
        (ss / (n - 1.0)).max(0.0)
    }
}

impl ChangeModel {
    pub fn new(params: ChangeParams) -> Result<Self, ModelLoadError> {
        let standard =
            Normal::new(0.0, 1.0).map_err(|e| ModelLoadError::InvalidParameter(e.to_string()))?;
        Ok(Self { params, standard })
    }

    fn log_expr(&self, count: f64, libsize: f64) -> f64 {
        if libsize <= 0.0 {
            return self.params.pseudocount.log2();
        }
        (count / libsize * self.params.scale + self.params.pseudocount).log2()
    }

    pub(crate) fn group_stats(&self, dataset: &Dataset, mask: &CellMask) -> GroupStats {
        let n_features = dataset.n_features();
        let baseline = self.params.pseudocount.log2();
        let mut stats = GroupStats {
            n: 0,
            baseline,
            sum: vec![0.0; n_features],
            sum_sq: vec![0.0; n_features],
        };
        for cell in mask.selected() {
            stats.n += 1;
            let lib = dataset.counts.libsizes[cell];
            for &(feature, count) in &dataset.counts.cols[cell] {
                let d = self.log_expr(count as f64, lib) - baseline;
                stats.sum[feature as usize] += d;
                stats.sum_sq[feature as usize] += d * d;
            }
        }
        stats
    }

    /// `P(|L| <= delta)` for `L ~ Normal(mean, sd)`.
    pub fn proba_not_de(&self, mean: f64, sd: f64) -> f64 {
        let delta = self.params.delta;
        if sd <= 0.0 {
            return if mean.abs() <= delta { 1.0 } else { 0.0 };
        }
        let upper = self.standard.cdf((delta - mean) / sd);
        let lower = self.standard.cdf((-delta - mean) / sd);
        (upper - lower).clamp(0.0, 1.0)
    }
}

impl DeModel for ChangeModel {
    fn name(&self) -> &str {
        "change-mode"
    }

    fn differential_expression(
        &self,
        dataset: &Dataset,
        group1: &CellMask,
        group2: &CellMask,
    ) -> Result<DeTable, ComputationError> {
        let expected = dataset.n_cells();
        for mask in [group1, group2] {
            if mask.len() != expected {
                return Err(ComputationError::MaskLength {
                    expected,
                    got: mask.len(),
                });
            }
        }

        let stats1 = self.group_stats(dataset, group1);
        let stats2 = self.group_stats(dataset, group2);
        if stats1.n == 0 {
            return Err(ComputationError::EmptyGroup { group: 1 });
        }
        if stats2.n == 0 {
            return Err(ComputationError::EmptyGroup { group: 2 });
        }

        let mut records = Vec::with_capacity(dataset.n_features());
        for feature in 0..dataset.n_features() {
            let lfc_mean = stats1.mean(feature) - stats2.mean(feature);
            let lfc_std = (stats1.variance(feature) / stats1.n as f64
                + stats2.variance(feature) / stats2.n as f64)
                .sqrt();
            if !lfc_mean.is_finite() || !lfc_std.is_finite() {
                let f = &dataset.features[feature];
                return Err(ComputationError::NonFinite {
                    feature: format!("{} ({})", f.id, f.symbol),
                });
            }
            let proba_not_de = self.proba_not_de(lfc_mean, lfc_std);
            records.push(DeRecord {
                feature,
                lfc_mean,
                lfc_std,
                proba_not_de,
                proba_de: 1.0 - proba_not_de,
            });
        }

        records.sort_by(|a, b| {
            a.proba_not_de
                .total_cmp(&b.proba_not_de)
                .then_with(|| b.lfc_mean.abs().total_cmp(&a.lfc_mean.abs()))
                .then(a.feature.cmp(&b.feature))
        });

        Ok(DeTable {
            records,
            n_cells1: stats1.n,
            n_cells2: stats2.n,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/change.rs"]
mod tests;
