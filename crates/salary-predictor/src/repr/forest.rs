//! Canonical forest representation (collection of trees).

use ndarray::ArrayView2;

use super::tree::{Tree, TreeValidationError};
use crate::utils::Parallelism;

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score is not finite")]
    NonFiniteBaseScore,

    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        #[source]
        error: TreeValidationError,
    },
}

/// Additive ensemble of regression trees.
///
/// Prediction is `base_score + Σ tree(row)`, accumulated in `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f64,
}

impl Forest {
    pub fn new(base_score: f64) -> Self {
        Self {
            trees: Vec::new(),
            base_score,
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Keep only the first `n_trees` trees.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    /// Validate every tree against a model with `n_features` inputs.
    pub fn validate(&self, n_features: usize) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore);
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }

    /// Predict a single row of transformed features.
    pub fn predict_row(&self, features: &[f32]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.predict_row(features))
    }

    /// Predict every row of a row-major `(n_rows, n_features)` matrix.
    pub fn predict(&self, features: ArrayView2<'_, f32>, parallelism: Parallelism) -> Vec<f64> {
        let (n_rows, n_features) = features.dim();
        match features.as_slice() {
            Some(flat) => parallelism.maybe_par_map(0..n_rows, |i| {
                self.predict_row(&flat[i * n_features..(i + 1) * n_features])
            }),
            None => features
                .rows()
                .into_iter()
                .map(|row| self.predict_row(&row.to_vec()))
                .collect(),
        }
    }
}
