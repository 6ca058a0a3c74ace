//! Schema types for pipeline serialization.
//!
//! These mirror the runtime types but evolve on their own; conversions live
//! in `convert`. Field order is the JSON output order.

use serde::{Deserialize, Serialize};

/// Current schema version written by this crate.
pub const SCHEMA_VERSION: &str = "v1";

/// Versioned top-level document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub schema_version: String,
    pub model_type: String,
    pub model: T,
}

// =============================================================================
// Features and preprocessing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTypeSchema {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSlotSchema {
    pub name: String,
    /// Source CSV column.
    pub column: String,
    pub feature_type: FeatureTypeSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesSchema {
    pub slots: Vec<FeatureSlotSchema>,
    pub target: String,
}

/// Transform of one input slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnTransformSchema {
    Scale { mean: f64, scale: f64 },
    OneHot { categories: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessorSchema {
    pub features: FeaturesSchema,
    pub columns: Vec<ColumnTransformSchema>,
}

// =============================================================================
// Trees
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveSchema {
    SquaredLoss,
    AbsoluteLoss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    pub num_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub objective: ObjectiveSchema,
}

/// Tree schema (SoA layout).
///
/// A node is a leaf iff its left child is `0`; the root can never be a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    pub num_nodes: u32,
    pub split_indices: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub children_left: Vec<u32>,
    pub children_right: Vec<u32>,
    pub leaf_values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSchema {
    pub trees: Vec<TreeSchema>,
    pub base_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBDTModelSchema {
    pub meta: ModelMetaSchema,
    pub forest: ForestSchema,
}

// =============================================================================
// Pipeline
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSchema {
    pub preprocessor: PreprocessorSchema,
    pub model: GBDTModelSchema,
}

impl PipelineSchema {
    pub const MODEL_TYPE: &'static str = "salary_pipeline";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_transform_is_tagged() {
        let json = serde_json::to_string(&ColumnTransformSchema::OneHot {
            categories: vec!["Male".into()],
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"one_hot","categories":["Male"]}"#);

        let parsed: ColumnTransformSchema = serde_json::from_str(r#"{"type":"scale","mean":1.5,"scale":2.0}"#).unwrap();
        assert!(matches!(parsed, ColumnTransformSchema::Scale { mean, scale } if mean == 1.5 && scale == 2.0));
    }

    #[test]
    fn meta_skips_missing_names() {
        let meta = ModelMetaSchema {
            num_features: 3,
            feature_names: None,
            objective: ObjectiveSchema::SquaredLoss,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("feature_names"));
        assert!(json.contains(r#""objective":{"type":"squared_loss"}"#));
    }
}
