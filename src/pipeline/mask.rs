use std::collections::BTreeSet;

/// Boolean selection over the dataset's cell axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask(Vec<bool>);

impl CellMask {
    pub fn none(n_cells: usize) -> Self {
        Self(vec![false; n_cells])
    }

    /// Selects every cell whose catalog code is in `selected`.
    pub fn from_codes(codes: &[u32], selected: &BTreeSet<u32>) -> Self {
        Self(codes.iter().map(|c| selected.contains(c)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn count_selected(&self) -> usize {
        self.0.iter().filter(|&&v| v).count()
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
    }
}

impl From<Vec<bool>> for CellMask {
    fn from(value: Vec<bool>) -> Self {
        Self(value)
    }
}
