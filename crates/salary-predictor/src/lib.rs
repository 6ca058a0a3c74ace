//! salary-predictor: gradient-boosted salary regression and its HTTP service.
//!
//! The crate trains a histogram-based GBDT on a small tabular salary survey
//! (`Age`, `Gender`, `Education_Level`, `Job_Title`, `Years_of_Experience`),
//! persists it with its preprocessing as a single JSON artifact, and serves
//! predictions over HTTP.
//!
//! # Key Types
//!
//! - [`SalaryPipeline`] - Preprocessor + [`GBDTModel`], fit and predict on raw rows
//! - [`GBDTConfig`] - Validated training configuration builder
//! - [`ArtifactStore`] - Read-only pipeline + [`EncodingTable`] loaded at startup
//! - [`PredictionService`] - Request validation and prediction
//!
//! # Training
//!
//! Load rows with [`data::io::load_salary_csv`], then call
//! [`SalaryPipeline::fit`] and [`ArtifactStore::save`].
//!
//! # Serving
//!
//! [`serve::serve`] loads an artifact directory and exposes `POST /predict`,
//! `GET /categories` and `GET /health`.

pub mod artifacts;
pub mod data;
pub mod encoding;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod preprocess;
pub mod repr;
pub mod serve;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Models and configuration
pub use model::{GBDTConfig, GBDTModel, ModelMeta};
pub use pipeline::{FitError, PredictError, SalaryPipeline};

// Training types
pub use training::{Metric, MetricFn, Objective, ObjectiveFn};

// Data types
pub use data::{FeatureSchema, FeatureType, FeatureValue, Row, SalaryDataset};
pub use encoding::EncodingTable;

// Serving
pub use artifacts::{ArtifactError, ArtifactStore};
pub use serve::{PredictionError, PredictionResponse, PredictionService};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
