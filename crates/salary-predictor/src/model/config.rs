//! High-level GBDT configuration with builder pattern.
//!
//! [`GBDTConfig`] uses the `bon` crate for builder generation; `build()`
//! validates every parameter.
//!
//! # Example
//!
//! ```
//! use salary_predictor::model::GBDTConfig;
//! use salary_predictor::training::Objective;
//!
//! // All defaults: 300 trees, learning rate 0.1, depth 4
//! let config = GBDTConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 300);
//!
//! let config = GBDTConfig::builder()
//!     .objective(Objective::absolute())
//!     .n_trees(50)
//!     .learning_rate(0.05)
//!     .early_stopping_rounds(10)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use crate::training::{GBDTParams, GainParams, Metric, Objective, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f64),

    #[error("n_trees must be at least 1")]
    InvalidNTrees,

    #[error("max_depth must be at least 1")]
    InvalidMaxDepth,

    #[error("max_bins must be in [2, 256], got {0}")]
    InvalidMaxBins(usize),

    #[error("{field} must be in (0, 1], got {value}")]
    InvalidSamplingRatio { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    InvalidRegularization { field: &'static str, value: f64 },
}

// =============================================================================
// RegularizationParams
// =============================================================================

/// Overfitting control.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizationParams {
    /// L2 penalty on leaf weights. Default: 1.0.
    pub lambda: f64,
    /// L1 penalty on leaf weights. Default: 0.0.
    pub alpha: f64,
    /// Minimum gain to keep a split. Default: 0.0.
    pub min_gain: f64,
    /// Minimum hessian sum per child. Default: 1.0.
    pub min_child_weight: f64,
    /// Minimum rows per child. Default: 1.
    pub min_samples_leaf: u32,
}

impl Default for RegularizationParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl RegularizationParams {
    fn to_gain_params(&self) -> GainParams {
        GainParams {
            reg_lambda: self.lambda,
            reg_alpha: self.alpha,
            min_gain: self.min_gain,
            min_child_weight: self.min_child_weight,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

// =============================================================================
// GBDTConfig
// =============================================================================

/// High-level configuration for GBDT model training.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GBDTConfig {
    // === Objective & Metric ===
    /// Loss function for training. Default: squared loss.
    #[builder(default)]
    pub objective: Objective,

    /// Metric logged per round and watched by early stopping. Default: RMSE.
    #[builder(default)]
    pub metric: Metric,

    // === Boosting parameters ===
    /// Number of boosting rounds. Default: 300.
    #[builder(default = 300)]
    pub n_trees: u32,

    /// Shrinkage applied to each tree. Default: 0.1.
    #[builder(default = 0.1)]
    pub learning_rate: f64,

    // === Tree structure ===
    /// Maximum tree depth. Default: 4.
    #[builder(default = 4)]
    pub max_depth: u32,

    /// Histogram bins per feature. Default: 256.
    #[builder(default = 256)]
    pub max_bins: usize,

    #[builder(default)]
    pub regularization: RegularizationParams,

    /// Row subsampling ratio per tree. Default: 1.0 (no sampling).
    #[builder(default = 1.0)]
    pub subsample: f64,

    // === Early stopping ===
    /// Stop training if no improvement for this many rounds.
    /// `None` disables early stopping.
    pub early_stopping_rounds: Option<u32>,

    // === Resource control ===
    /// Number of threads. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    // === Reproducibility ===
    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: g_b_d_t_config_builder::IsComplete> GBDTConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is out of range.
    pub fn build(self) -> Result<GBDTConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl Default for GBDTConfig {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            metric: Metric::default(),
            n_trees: 300,
            learning_rate: 0.1,
            max_depth: 4,
            max_bins: 256,
            regularization: RegularizationParams::default(),
            subsample: 1.0,
            early_stopping_rounds: None,
            n_threads: None,
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

impl GBDTConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if !(2..=256).contains(&self.max_bins) {
            return Err(ConfigError::InvalidMaxBins(self.max_bins));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ConfigError::InvalidSamplingRatio {
                field: "subsample",
                value: self.subsample,
            });
        }

        let reg = &self.regularization;
        for (field, value) in [
            ("lambda", reg.lambda),
            ("alpha", reg.alpha),
            ("min_gain", reg.min_gain),
            ("min_child_weight", reg.min_child_weight),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidRegularization { field, value });
            }
        }
        Ok(())
    }

    /// Thread count for [`run_with_threads`](crate::utils::run_with_threads): `0` = auto.
    pub fn n_threads(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }

    /// Low-level trainer parameters.
    pub fn to_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            max_bins: self.max_bins,
            gain: self.regularization.to_gain_params(),
            subsample: self.subsample,
            early_stopping_rounds: self.early_stopping_rounds.unwrap_or(0),
            seed: self.seed,
            verbosity: self.verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_builder() {
        let built = GBDTConfig::builder().build().unwrap();
        let default = GBDTConfig::default();
        assert_eq!(built.n_trees, default.n_trees);
        assert_eq!(built.learning_rate, default.learning_rate);
        assert_eq!(built.max_depth, 4);
        assert_eq!(built.seed, 42);
        assert_eq!(built.regularization, RegularizationParams::default());
        assert_eq!(built.n_threads(), 0);
    }

    #[rstest]
    #[case(GBDTConfig::builder().learning_rate(0.0).build(), ConfigError::InvalidLearningRate(0.0))]
    #[case(GBDTConfig::builder().n_trees(0).build(), ConfigError::InvalidNTrees)]
    #[case(GBDTConfig::builder().max_depth(0).build(), ConfigError::InvalidMaxDepth)]
    #[case(GBDTConfig::builder().max_bins(512).build(), ConfigError::InvalidMaxBins(512))]
    #[case(
        GBDTConfig::builder().subsample(1.5).build(),
        ConfigError::InvalidSamplingRatio { field: "subsample", value: 1.5 }
    )]
    fn invalid_values_are_rejected(#[case] result: Result<GBDTConfig, ConfigError>, #[case] expected: ConfigError) {
        assert_eq!(result.unwrap_err(), expected);
    }

    #[test]
    fn negative_regularization_is_rejected() {
        let err = GBDTConfig::builder()
            .regularization(RegularizationParams {
                lambda: -1.0,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidRegularization {
                field: "lambda",
                value: -1.0
            }
        );
    }

    #[test]
    fn to_params_carries_values() {
        let config = GBDTConfig::builder()
            .n_trees(7)
            .early_stopping_rounds(3)
            .n_threads(NonZeroUsize::new(2).unwrap())
            .build()
            .unwrap();
        let params = config.to_params();
        assert_eq!(params.n_trees, 7);
        assert_eq!(params.early_stopping_rounds, 3);
        assert_eq!(params.gain.reg_lambda, 1.0);
        assert_eq!(config.n_threads(), 2);
    }
}
