//! GBDT trainer for gradient boosting.
//!
//! Orchestrates the boosting loop: gradients from the objective, optional row
//! subsampling, tree growth, prediction updates, evaluation and early
//! stopping.
//!
//! # Example
//!
//! ```ignore
//! use salary_predictor::training::{GBDTParams, GBDTTrainer, Rmse, SquaredLoss};
//!
//! let trainer = GBDTTrainer::new(SquaredLoss, Rmse, GBDTParams::default());
//! let forest = trainer.train(features.view(), &targets, &[], Parallelism::Sequential)?;
//! ```

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::binning::BinnedMatrix;
use super::grower::{GrowerParams, TreeGrower};
use super::split::GainParams;
use crate::repr::Forest;
use crate::training::callback::{EarlyStopAction, EarlyStopping};
use crate::training::logger::{MetricValue, TrainingLogger, Verbosity};
use crate::training::{Gradients, MetricFn, ObjectiveFn};
use crate::utils::Parallelism;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur before or during training.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyDataset,

    #[error("training set has no features")]
    NoFeatures,

    #[error("{n_targets} targets for {n_rows} rows")]
    TargetLenMismatch { n_rows: usize, n_targets: usize },

    #[error("target at row {row} is not finite")]
    NonFiniteTarget { row: usize },

    #[error("feature {feature} at row {row} is not finite")]
    NonFiniteFeature { row: usize, feature: usize },

    #[error("eval set {name}: expected {expected} features and matching targets")]
    EvalShape { name: String, expected: usize },
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
#[derive(Clone, Debug)]
pub struct GBDTParams {
    pub n_trees: u32,
    pub learning_rate: f64,
    pub max_depth: u32,
    /// Maximum histogram bins per feature (at most 256).
    pub max_bins: usize,
    pub gain: GainParams,
    /// Fraction of rows sampled (without replacement) per tree.
    pub subsample: f64,
    /// Stop after this many rounds without improvement. `0` disables.
    pub early_stopping_rounds: u32,
    pub seed: u64,
    pub verbosity: Verbosity,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            learning_rate: 0.1,
            max_depth: 4,
            max_bins: 256,
            gain: GainParams::default(),
            subsample: 1.0,
            early_stopping_rounds: 0,
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

/// Held-out data evaluated after every round.
#[derive(Clone, Copy, Debug)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    /// Row-major `(n_rows, n_features)`.
    pub features: ArrayView2<'a, f32>,
    pub targets: &'a [f64],
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// GBDT trainer.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    /// Train a forest on row-major `features` and `targets`.
    ///
    /// When eval sets are given, early stopping watches the first one;
    /// otherwise it watches the training metric. With early stopping the
    /// forest is truncated to the best round.
    pub fn train(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f64],
        eval_sets: &[EvalSet<'_>],
        parallelism: Parallelism,
    ) -> Result<Forest, TrainError> {
        let (n_rows, n_features) = features.dim();
        self.check_inputs(features, targets, eval_sets)?;

        let features = features.as_standard_layout();
        let eval_features: Vec<_> = eval_sets.iter().map(|es| es.features.as_standard_layout()).collect();

        let binned = BinnedMatrix::from_features(features.view(), self.params.max_bins, parallelism);
        let grower_params = GrowerParams {
            gain: self.params.gain.clone(),
            learning_rate: self.params.learning_rate,
            max_depth: self.params.max_depth,
        };
        let mut grower = TreeGrower::new(&binned, grower_params, parallelism);

        let base_score = self.objective.base_score(targets);
        let mut forest = Forest::new(base_score);
        let mut predictions = vec![base_score; n_rows];
        let mut eval_predictions: Vec<Vec<f64>> =
            eval_sets.iter().map(|es| vec![base_score; es.targets.len()]).collect();

        let mut gradients = Gradients::new(n_rows);
        let all_rows: Vec<u32> = (0..n_rows as u32).collect();
        let n_sampled = ((n_rows as f64) * self.params.subsample).ceil().clamp(1.0, n_rows as f64) as usize;
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let mut early_stopping = EarlyStopping::new(
            self.params.early_stopping_rounds as usize,
            self.metric.higher_is_better(),
        );
        let mut best_n_trees = 0usize;

        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(self.params.n_trees as usize, n_rows, n_features);

        for round in 0..self.params.n_trees as usize {
            let (grads, hess) = gradients.pairs_mut();
            self.objective.compute_gradients(&predictions, targets, grads, hess);

            let tree = if n_sampled < n_rows {
                let mut rows: Vec<u32> = rand::seq::index::sample(&mut rng, n_rows, n_sampled)
                    .into_iter()
                    .map(|i| i as u32)
                    .collect();
                rows.sort_unstable();
                grower.grow(&gradients, &rows)
            } else {
                grower.grow(&gradients, &all_rows)
            };

            let flat = features.as_slice().unwrap_or(&[]);
            let deltas = parallelism.maybe_par_map(0..n_rows, |i| {
                tree.predict_row(&flat[i * n_features..(i + 1) * n_features])
            });
            for (p, d) in predictions.iter_mut().zip(deltas) {
                *p += d;
            }
            for (preds, matrix) in eval_predictions.iter_mut().zip(&eval_features) {
                for (p, row) in preds.iter_mut().zip(matrix.rows()) {
                    *p += row.as_slice().map_or_else(|| tree.predict_row(&row.to_vec()), |r| tree.predict_row(r));
                }
            }
            forest.push_tree(tree);

            let mut round_metrics = Vec::with_capacity(eval_sets.len() + 1);
            round_metrics.push(MetricValue {
                dataset: "train".to_string(),
                metric: self.metric.name(),
                value: self.metric.compute(&predictions, targets),
            });
            for (es, preds) in eval_sets.iter().zip(&eval_predictions) {
                round_metrics.push(MetricValue {
                    dataset: es.name.to_string(),
                    metric: self.metric.name(),
                    value: self.metric.compute(preds, es.targets),
                });
            }
            logger.log_round(round, &round_metrics);

            if early_stopping.is_enabled() {
                let watched = round_metrics.get(1).unwrap_or(&round_metrics[0]).value;
                match early_stopping.update(watched) {
                    EarlyStopAction::Improved => best_n_trees = forest.n_trees(),
                    EarlyStopAction::Stop => {
                        logger.log_early_stopping(round, early_stopping.best_round(), self.metric.name());
                        break;
                    }
                    EarlyStopAction::Continue => {}
                }
            }
        }

        if early_stopping.is_enabled() && best_n_trees > 0 && best_n_trees < forest.n_trees() {
            forest.truncate(best_n_trees);
        }
        logger.finish_training(forest.n_trees());

        Ok(forest)
    }

    fn check_inputs(
        &self,
        features: ArrayView2<'_, f32>,
        targets: &[f64],
        eval_sets: &[EvalSet<'_>],
    ) -> Result<(), TrainError> {
        let (n_rows, n_features) = features.dim();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if n_features == 0 {
            return Err(TrainError::NoFeatures);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLenMismatch {
                n_rows,
                n_targets: targets.len(),
            });
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            return Err(TrainError::NonFiniteTarget { row });
        }
        if let Some(((row, feature), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(TrainError::NonFiniteFeature { row, feature });
        }
        for es in eval_sets {
            if es.features.ncols() != n_features || es.features.nrows() != es.targets.len() {
                return Err(TrainError::EvalShape {
                    name: es.name.to_string(),
                    expected: n_features,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::training::{Rmse, SquaredLoss};

    fn linear_data(n: usize) -> (Array2<f32>, Vec<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| ((i * (j + 1) * 7) % 31) as f32);
        let y = x.rows().into_iter().map(|r| 3.0 * r[0] as f64 - 2.0 * r[1] as f64 + 10.0).collect();
        (x, y)
    }

    fn params(n_trees: u32) -> GBDTParams {
        GBDTParams {
            n_trees,
            learning_rate: 0.3,
            ..Default::default()
        }
    }

    #[test]
    fn training_reduces_error() {
        let (x, y) = linear_data(200);
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params(30));
        let forest = trainer.train(x.view(), &y, &[], Parallelism::Sequential).unwrap();

        let preds = forest.predict(x.view(), Parallelism::Sequential);
        let base = vec![forest.base_score(); y.len()];
        assert_eq!(forest.n_trees(), 30);
        assert!(Rmse.compute(&preds, &y) < 0.2 * Rmse.compute(&base, &y));
    }

    #[test]
    fn early_stopping_truncates_forest() {
        let (x, y) = linear_data(120);
        // Unrelated validation targets: fitting the training set only hurts.
        let (vx, _) = linear_data(40);
        let vy = vec![0.0; 40];
        let mut p = params(500);
        p.early_stopping_rounds = 3;
        p.learning_rate = 1.0;
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, p);
        let eval = [EvalSet {
            name: "valid",
            features: vx.view(),
            targets: &vy,
        }];
        let forest = trainer.train(x.view(), &y, &eval, Parallelism::Sequential).unwrap();
        assert!(forest.n_trees() < 500);
    }

    #[test]
    fn subsampling_is_seeded() {
        let (x, y) = linear_data(100);
        let mut p = params(5);
        p.subsample = 0.5;
        let a = GBDTTrainer::new(SquaredLoss, Rmse, p.clone())
            .train(x.view(), &y, &[], Parallelism::Sequential)
            .unwrap();
        let b = GBDTTrainer::new(SquaredLoss, Rmse, p)
            .train(x.view(), &y, &[], Parallelism::Parallel)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_invalid_inputs() {
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params(1));
        let x = Array2::<f32>::zeros((3, 1));

        assert_eq!(
            trainer.train(x.view(), &[1.0, 2.0], &[], Parallelism::Sequential),
            Err(TrainError::TargetLenMismatch { n_rows: 3, n_targets: 2 })
        );
        assert_eq!(
            trainer.train(x.view(), &[1.0, f64::NAN, 2.0], &[], Parallelism::Sequential),
            Err(TrainError::NonFiniteTarget { row: 1 })
        );
        assert_eq!(
            trainer.train(Array2::<f32>::zeros((0, 1)).view(), &[], &[], Parallelism::Sequential),
            Err(TrainError::EmptyDataset)
        );

        let mut bad = x.clone();
        bad[[2, 0]] = f32::INFINITY;
        assert_eq!(
            trainer.train(bad.view(), &[1.0, 2.0, 3.0], &[], Parallelism::Sequential),
            Err(TrainError::NonFiniteFeature { row: 2, feature: 0 })
        );
    }
}
