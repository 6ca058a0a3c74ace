//! Column preprocessing between raw rows and the tree model.
//!
//! Each schema slot owns one [`ColumnTransform`]:
//!
//! - numeric slots are standardised ([`StandardScaler`]), one output column
//! - categorical slots are one-hot encoded ([`OneHotEncoder`]), one output
//!   column per known label, unknown labels ignored
//!
//! Output columns follow schema order.

mod onehot;
mod scaler;

pub use onehot::OneHotEncoder;
pub use scaler::StandardScaler;

use ndarray::Array2;

use crate::data::{FeatureSchema, FeatureType, FeatureValue, Row};
use crate::encoding::{EncodingError, EncodingTable};

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while fitting or applying a [`Preprocessor`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("expected {expected} values per row, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("feature {feature} expects a {expected} value")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
    },

    #[error("feature {feature} has non-finite value {value}")]
    NonFinite { feature: String, value: f64 },

    #[error("cannot fit on an empty dataset")]
    EmptyInput,

    #[error("preprocessor does not match schema: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

// =============================================================================
// Column transforms
// =============================================================================

/// Transform applied to one schema slot.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnTransform {
    Scale(StandardScaler),
    OneHot(OneHotEncoder),
}

impl ColumnTransform {
    /// Number of output columns.
    pub fn width(&self) -> usize {
        match self {
            ColumnTransform::Scale(_) => 1,
            ColumnTransform::OneHot(enc) => enc.width(),
        }
    }

    fn feature_type(&self) -> FeatureType {
        match self {
            ColumnTransform::Scale(_) => FeatureType::Numeric,
            ColumnTransform::OneHot(_) => FeatureType::Categorical,
        }
    }
}

// =============================================================================
// Preprocessor
// =============================================================================

/// Fitted per-slot transforms for a [`FeatureSchema`].
#[derive(Clone, Debug, PartialEq)]
pub struct Preprocessor {
    schema: FeatureSchema,
    columns: Vec<ColumnTransform>,
    n_outputs: usize,
}

impl Preprocessor {
    /// Assemble from already-fitted transforms (used when loading artifacts).
    pub fn from_parts(
        schema: FeatureSchema,
        columns: Vec<ColumnTransform>,
    ) -> Result<Self, TransformError> {
        if columns.len() != schema.n_features() {
            return Err(TransformError::Inconsistent(format!(
                "{} transforms for {} slots",
                columns.len(),
                schema.n_features()
            )));
        }
        for (slot, column) in schema.slots().iter().zip(&columns) {
            if slot.feature_type != column.feature_type() {
                return Err(TransformError::Inconsistent(format!(
                    "slot {} is {} but its transform is {}",
                    slot.name,
                    slot.feature_type.as_str(),
                    column.feature_type().as_str()
                )));
            }
        }
        let n_outputs = columns.iter().map(ColumnTransform::width).sum();
        Ok(Self {
            schema,
            columns,
            n_outputs,
        })
    }

    /// Fit scalers and encoders on training rows.
    pub fn fit(schema: &FeatureSchema, rows: &[Row]) -> Result<Self, TransformError> {
        if rows.is_empty() {
            return Err(TransformError::EmptyInput);
        }
        for row in rows {
            check_row(schema, row)?;
        }

        let columns = schema
            .slots()
            .iter()
            .enumerate()
            .map(|(idx, slot)| match slot.feature_type {
                FeatureType::Numeric => {
                    let values: Vec<f64> = rows.iter().filter_map(|r| r[idx].as_numeric()).collect();
                    ColumnTransform::Scale(StandardScaler::fit(&values))
                }
                FeatureType::Categorical => {
                    ColumnTransform::OneHot(OneHotEncoder::fit(rows.iter().filter_map(|r| r[idx].as_label())))
                }
            })
            .collect();

        Self::from_parts(schema.clone(), columns)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn columns(&self) -> &[ColumnTransform] {
        &self.columns
    }

    /// Width of the transformed feature vector.
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Names of the output columns (`Age`, `Gender=Male`, ...).
    pub fn output_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_outputs);
        for (slot, column) in self.schema.slots().iter().zip(&self.columns) {
            match column {
                ColumnTransform::Scale(_) => names.push(slot.name.clone()),
                ColumnTransform::OneHot(enc) => {
                    names.extend(enc.categories().iter().map(|c| format!("{}={}", slot.name, c)))
                }
            }
        }
        names
    }

    /// Transform one row into `out` (length [`n_outputs`](Self::n_outputs)).
    pub fn transform_row_into(&self, row: &[FeatureValue], out: &mut [f32]) -> Result<(), TransformError> {
        check_row(&self.schema, row)?;
        debug_assert_eq!(out.len(), self.n_outputs);

        let mut offset = 0;
        for (value, column) in row.iter().zip(&self.columns) {
            let width = column.width();
            let dst = &mut out[offset..offset + width];
            match (column, value) {
                (ColumnTransform::Scale(scaler), FeatureValue::Numeric(v)) => dst[0] = scaler.transform(*v),
                (ColumnTransform::OneHot(enc), FeatureValue::Categorical(label)) => enc.transform_into(label, dst),
                // check_row already rejected kind mismatches
                _ => unreachable!("row kinds validated against schema"),
            }
            offset += width;
        }
        Ok(())
    }

    pub fn transform_row(&self, row: &[FeatureValue]) -> Result<Vec<f32>, TransformError> {
        let mut out = vec![0.0; self.n_outputs];
        self.transform_row_into(row, &mut out)?;
        Ok(out)
    }

    /// Transform many rows into a row-major `(n_rows, n_outputs)` matrix.
    pub fn transform(&self, rows: &[Row]) -> Result<Array2<f32>, TransformError> {
        let mut matrix = Array2::<f32>::zeros((rows.len(), self.n_outputs));
        for (row, mut out) in rows.iter().zip(matrix.rows_mut()) {
            let out = out
                .as_slice_mut()
                .ok_or_else(|| TransformError::Inconsistent("non-contiguous output row".into()))?;
            self.transform_row_into(row, out)?;
        }
        Ok(matrix)
    }

    /// Category vocabularies of the categorical slots, in schema order.
    pub fn encoding_table(&self) -> Result<EncodingTable, TransformError> {
        let mut table = EncodingTable::new();
        for (slot, column) in self.schema.slots().iter().zip(&self.columns) {
            if let ColumnTransform::OneHot(enc) = column {
                table.insert(slot.name.clone(), enc.categories().to_vec())?;
            }
        }
        Ok(table)
    }
}

fn check_row(schema: &FeatureSchema, row: &[FeatureValue]) -> Result<(), TransformError> {
    if row.len() != schema.n_features() {
        return Err(TransformError::ShapeMismatch {
            expected: schema.n_features(),
            got: row.len(),
        });
    }
    for (slot, value) in schema.slots().iter().zip(row) {
        match (slot.feature_type, value) {
            (FeatureType::Numeric, FeatureValue::Numeric(v)) => {
                if !v.is_finite() {
                    return Err(TransformError::NonFinite {
                        feature: slot.name.clone(),
                        value: *v,
                    });
                }
            }
            (FeatureType::Categorical, FeatureValue::Categorical(_)) => {}
            (expected, _) => {
                return Err(TransformError::TypeMismatch {
                    feature: slot.name.clone(),
                    expected: expected.as_str(),
                })
            }
        }
    }
    Ok(())
}
