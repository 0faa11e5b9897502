use std::ops::Range;

use crate::domain::Corpus;
use crate::error::ChemblError;

const PROPORTION_TOLERANCE: f64 = 1e-6;

/// Named, ordered partition of the filtered list by cumulative proportions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan {
    names: Vec<String>,
    cumulative: Vec<f64>,
}

impl SplitPlan {
    pub fn new(names: &[String], proportions: &[f64]) -> Result<Self, ChemblError> {
        if names.is_empty() {
            return Err(ChemblError::InvalidSplitConfig(
                "at least one set is required".to_string(),
            ));
        }
        if names.len() != proportions.len() {
            return Err(ChemblError::InvalidSplitConfig(format!(
                "{} sets but {} proportions",
                names.len(),
                proportions.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ChemblError::InvalidSplitConfig(format!(
                    "duplicate set name: {name}"
                )));
            }
        }
        if let Some(bad) = proportions.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(ChemblError::InvalidSplitConfig(format!(
                "invalid proportion: {bad}"
            )));
        }

        let mut cumulative = Vec::with_capacity(proportions.len());
        let mut total = 0.0;
        for p in proportions {
            total += p;
            cumulative.push(total);
        }
        if (total - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(ChemblError::InvalidSplitConfig(format!(
                "proportions sum to {total}, expected 1.0"
            )));
        }
        // The last set always runs to the end of the list.
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self {
            names: names.to_vec(),
            cumulative,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, set: &str) -> Result<usize, ChemblError> {
        self.names
            .iter()
            .position(|name| name == set)
            .ok_or_else(|| ChemblError::InvalidSplit(set.to_string()))
    }

    /// Index range of set `index` within a filtered list of `len` entries.
    ///
    /// Set 0 starts at 0, every later set starts at `ceil(len * cum[i - 1])`,
    /// and each set ends where the next one starts; the last ends at `len`.
    ///
    /// An interior set therefore ends at `ceil(len * cum[i])` rather than
    /// `floor(len * cum[i])`. Starts are unchanged, so no entry moves to a
    /// different set; the entry a floored end would drop (for `len = 7` and
    /// `[0.5, 0.1, 0.4]`, index 4) stays in the set that precedes the gap.
    pub fn bounds(&self, len: usize, index: usize) -> Range<usize> {
        let start = if index == 0 {
            0
        } else {
            self.boundary(len, index - 1)
        };
        let end = if index + 1 == self.cumulative.len() {
            (len as f64 * self.cumulative[index]) as usize
        } else {
            self.boundary(len, index)
        };
        let end = end.min(len);
        start.min(end)..end
    }

    fn boundary(&self, len: usize, index: usize) -> usize {
        let raw = (len as f64 * self.cumulative[index]).ceil() as usize;
        let floor = if index == 0 {
            0
        } else {
            self.boundary(len, index - 1)
        };
        raw.clamp(floor, len)
    }

    pub fn select<'a>(&self, filtered: &'a [String], set: &str) -> Result<&'a [String], ChemblError> {
        let index = self.index_of(set)?;
        Ok(&filtered[self.bounds(filtered.len(), index)])
    }
}

/// SMILES of every molecule with at most `max_atoms` heavy atoms, in stored order.
pub fn filter_by_heavy_atoms(corpus: &Corpus, max_atoms: usize) -> Vec<String> {
    corpus
        .iter()
        .filter(|m| m.heavy_atom_count <= max_atoms)
        .map(|m| m.canonical_smiles.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_sets, default_splits};

    #[test]
    fn default_plan_on_ten_entries() {
        let plan = SplitPlan::new(&default_sets(), &default_splits()).unwrap();
        assert_eq!(plan.bounds(10, 0), 0..5);
        assert_eq!(plan.bounds(10, 1), 5..6);
        assert_eq!(plan.bounds(10, 2), 6..10);
    }

    #[test]
    fn non_integer_boundaries_round_up() {
        let plan = SplitPlan::new(&default_sets(), &default_splits()).unwrap();
        // 7 * 0.5 = 3.5, 7 * 0.6 = 4.2
        assert_eq!(plan.bounds(7, 0), 0..4);
        assert_eq!(plan.bounds(7, 1), 4..5);
        assert_eq!(plan.bounds(7, 2), 5..7);
    }

    #[test]
    fn empty_list_gives_empty_sets() {
        let plan = SplitPlan::new(&default_sets(), &default_splits()).unwrap();
        for i in 0..3 {
            assert!(plan.bounds(0, i).is_empty());
        }
    }
}
