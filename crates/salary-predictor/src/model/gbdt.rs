//! GBDT model: a trained forest plus metadata.

use ndarray::ArrayView2;

use super::config::GBDTConfig;
use super::meta::ModelMeta;
use crate::repr::{Forest, ForestValidationError};
use crate::training::{EvalSet, GBDTTrainer, TrainError};
use crate::utils::{run_with_threads, Parallelism};

/// High-level GBDT regression model.
#[derive(Clone, PartialEq)]
pub struct GBDTModel {
    forest: Forest,
    meta: ModelMeta,
}

impl GBDTModel {
    /// Wrap an existing forest, validating it against `meta.n_features`.
    pub fn from_parts(forest: Forest, meta: ModelMeta) -> Result<Self, ForestValidationError> {
        forest.validate(meta.n_features)?;
        Ok(Self { forest, meta })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn n_features(&self) -> usize {
        self.meta.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train on row-major `features` with the given configuration.
    ///
    /// Runs on a dedicated thread pool sized by `config.n_threads`.
    pub fn train(
        features: ArrayView2<'_, f32>,
        targets: &[f64],
        eval_sets: &[EvalSet<'_>],
        config: &GBDTConfig,
    ) -> Result<Self, TrainError> {
        run_with_threads(config.n_threads(), |parallelism| {
            let trainer = GBDTTrainer::new(config.objective, config.metric, config.to_params());
            let forest = trainer.train(features, targets, eval_sets, parallelism)?;
            let meta = ModelMeta::new(features.ncols(), config.objective);
            Ok(Self { forest, meta })
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict one row of transformed features.
    pub fn predict_row(&self, features: &[f32]) -> f64 {
        debug_assert_eq!(features.len(), self.meta.n_features);
        self.forest.predict_row(features)
    }

    /// Predict a row-major batch. `n_threads`: `0` = auto, `1` = sequential.
    pub fn predict(&self, features: ArrayView2<'_, f32>, n_threads: usize) -> Vec<f64> {
        if features.nrows() == 0 {
            return Vec::new();
        }
        run_with_threads(n_threads, |parallelism| self.forest.predict(features, parallelism))
    }

    /// Predict on the calling thread with an explicit parallelism flag.
    pub fn predict_with(&self, features: ArrayView2<'_, f32>, parallelism: Parallelism) -> Vec<f64> {
        self.forest.predict(features, parallelism)
    }

    // =========================================================================
    // Feature Importance
    // =========================================================================

    /// Number of splits using each feature, across all trees.
    pub fn split_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.meta.n_features];
        for tree in self.forest.trees() {
            for node in 0..tree.n_nodes() as u32 {
                if !tree.is_leaf(node) {
                    counts[tree.split_feature(node) as usize] += 1;
                }
            }
        }
        counts
    }

    pub(crate) fn set_feature_names(&mut self, names: Vec<String>) {
        self.meta.feature_names = Some(names);
    }
}

impl std::fmt::Debug for GBDTModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GBDTModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.meta.n_features)
            .field("objective", &self.meta.objective)
            .field("base_score", &self.forest.base_score())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::repr::TreeBuilder;
    use crate::training::Objective;

    fn stump_forest() -> Forest {
        let mut b = TreeBuilder::new();
        let root = b.add_node();
        let (l, r) = b.split(root, 1, 0.5);
        b.set_leaf(l, -1.0);
        b.set_leaf(r, 1.0);
        let mut forest = Forest::new(10.0);
        forest.push_tree(b.build());
        forest
    }

    #[test]
    fn from_parts_validates_feature_count() {
        let meta = ModelMeta::new(1, Objective::SquaredLoss);
        assert!(GBDTModel::from_parts(stump_forest(), meta).is_err());

        let model = GBDTModel::from_parts(stump_forest(), ModelMeta::new(2, Objective::SquaredLoss)).unwrap();
        assert_eq!(model.predict_row(&[0.0, 0.0]), 9.0);
        assert_eq!(model.predict_row(&[0.0, 1.0]), 11.0);
        assert_eq!(model.split_counts(), vec![0, 1]);
    }

    #[test]
    fn batch_prediction_matches_rows() {
        let model = GBDTModel::from_parts(stump_forest(), ModelMeta::new(2, Objective::SquaredLoss)).unwrap();
        let x = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 0.0, 1.0, 5.0, 0.2]).unwrap();
        assert_eq!(model.predict(x.view(), 1), vec![9.0, 11.0, 9.0]);
        assert_eq!(model.predict(x.view(), 2), vec![9.0, 11.0, 9.0]);
        assert!(model.predict(Array2::<f32>::zeros((0, 2)).view(), 0).is_empty());
    }

    #[test]
    fn train_uses_config() {
        let x = Array2::from_shape_fn((60, 1), |(i, _)| i as f32);
        let y: Vec<f64> = (0..60).map(|i| if i < 30 { 100.0 } else { 200.0 }).collect();
        let config = GBDTConfig::builder().n_trees(20).learning_rate(0.5).build().unwrap();
        let model = GBDTModel::train(x.view(), &y, &[], &config).unwrap();

        assert_eq!(model.n_trees(), 20);
        assert_eq!(model.n_features(), 1);
        assert!((model.predict_row(&[0.0]) - 100.0).abs() < 1.0);
        assert!((model.predict_row(&[59.0]) - 200.0).abs() < 1.0);
    }
}
