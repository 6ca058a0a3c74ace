//! Preprocessor and GBDT model bundled as a single predictor.
//!
//! A [`SalaryPipeline`] consumes raw rows in schema order (labels, not codes)
//! and returns salaries. It is the unit that gets persisted and served.

use ndarray::Array2;

use crate::data::{FeatureSchema, Row, SalaryDataset};
use crate::encoding::EncodingTable;
use crate::model::{GBDTConfig, GBDTModel};
use crate::preprocess::{Preprocessor, TransformError};
use crate::training::{EvalSet, TrainError};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while fitting a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("preprocessing failed: {0}")]
    Transform(#[from] TransformError),

    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    #[error("pipeline is inconsistent: {0}")]
    Inconsistent(String),
}

/// Errors raised by [`SalaryPipeline::predict`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("prediction for row {row} is not finite")]
    NonFinite { row: usize },
}

// =============================================================================
// SalaryPipeline
// =============================================================================

/// Fitted preprocessing plus tree ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryPipeline {
    preprocessor: Preprocessor,
    model: GBDTModel,
}

impl SalaryPipeline {
    /// Assemble from fitted parts. The model must consume exactly the
    /// preprocessor's output width.
    pub fn from_parts(preprocessor: Preprocessor, model: GBDTModel) -> Result<Self, FitError> {
        if preprocessor.n_outputs() != model.n_features() {
            return Err(FitError::Inconsistent(format!(
                "preprocessor produces {} features, model expects {}",
                preprocessor.n_outputs(),
                model.n_features()
            )));
        }
        Ok(Self { preprocessor, model })
    }

    /// Fit the preprocessor on `train`, then boost trees on the transformed
    /// matrix. `eval`, if given, is logged per round and drives early stopping.
    pub fn fit(
        schema: &FeatureSchema,
        train: &SalaryDataset,
        eval: Option<&SalaryDataset>,
        config: &GBDTConfig,
    ) -> Result<Self, FitError> {
        let preprocessor = Preprocessor::fit(schema, &train.rows)?;
        let x_train = preprocessor.transform(&train.rows)?;

        let x_eval: Option<Array2<f32>> = eval.map(|ds| preprocessor.transform(&ds.rows)).transpose()?;
        let eval_sets: Vec<EvalSet<'_>> = match (&x_eval, eval) {
            (Some(x), Some(ds)) => vec![EvalSet {
                name: "valid",
                features: x.view(),
                targets: &ds.targets,
            }],
            _ => Vec::new(),
        };

        tracing::debug!(
            n_rows = train.n_rows(),
            n_features = preprocessor.n_outputs(),
            "fitting salary pipeline"
        );
        let mut model = GBDTModel::train(x_train.view(), &train.targets, &eval_sets, config)?;
        model.set_feature_names(preprocessor.output_names());

        Self::from_parts(preprocessor, model)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn model(&self) -> &GBDTModel {
        &self.model
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.preprocessor.schema()
    }

    /// Category vocabularies of the categorical slots.
    pub fn encoding_table(&self) -> Result<EncodingTable, TransformError> {
        self.preprocessor.encoding_table()
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict one raw row.
    pub fn predict_row(&self, row: &Row) -> Result<f64, PredictError> {
        let features = self.preprocessor.transform_row(row)?;
        let value = self.model.predict_row(&features);
        if !value.is_finite() {
            return Err(PredictError::NonFinite { row: 0 });
        }
        Ok(value)
    }

    /// Predict a batch of raw rows on the calling thread.
    pub fn predict(&self, rows: &[Row]) -> Result<Vec<f64>, PredictError> {
        let features = self.preprocessor.transform(rows)?;
        let values = self.model.predict(features.view(), 1);
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::NonFinite { row });
        }
        Ok(values)
    }
}
