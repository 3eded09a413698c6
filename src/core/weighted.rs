use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Categorical table sampled proportionally to unnormalized weights.
///
/// Backed by [`WeightedIndex`], which returns the first entry whose running weight
/// sum is strictly greater than a uniform draw over the total.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    values: Vec<T>,
    index: Option<WeightedIndex<f64>>,
}

impl<T> WeightedTable<T> {
    /// Builds a table from `(value, weight)` pairs.
    ///
    /// Returns `None` when the table is empty or the weights are unusable
    /// (all zero, negative or not finite).
    pub fn new(weighted: Vec<(T, f64)>) -> Option<Self> {
        if weighted.is_empty() {
            return None;
        }
        let (values, weights): (Vec<T>, Vec<f64>) = weighted.into_iter().unzip();
        let index = WeightedIndex::new(weights).ok()?;
        Some(Self {
            values,
            index: Some(index),
        })
    }

    /// Table that always yields `value`.
    pub fn single(value: T) -> Self {
        Self {
            values: vec![value],
            index: None,
        }
    }

    /// Picks one entry.
    pub fn choose<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> &'a T {
        let idx = match &self.index {
            Some(index) => index.sample(rng),
            None => self.values.len() - 1,
        };
        &self.values[idx]
    }

    pub fn entries(&self) -> &[T] {
        &self.values
    }
}
