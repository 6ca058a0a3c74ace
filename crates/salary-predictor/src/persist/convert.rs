//! Conversions between runtime types and schema types.
//!
//! Writing is infallible (`From`); reading validates structure (`TryFrom`).

use std::collections::HashSet;

use super::error::ReadError;
use super::schema::*;
use crate::data::{FeatureSchema, FeatureSlot, FeatureType};
use crate::model::{GBDTModel, ModelMeta};
use crate::pipeline::SalaryPipeline;
use crate::preprocess::{ColumnTransform, OneHotEncoder, Preprocessor, StandardScaler};
use crate::repr::{Forest, Tree};
use crate::training::Objective;

// =============================================================================
// Feature schema
// =============================================================================

impl From<FeatureType> for FeatureTypeSchema {
    fn from(value: FeatureType) -> Self {
        match value {
            FeatureType::Numeric => FeatureTypeSchema::Numeric,
            FeatureType::Categorical => FeatureTypeSchema::Categorical,
        }
    }
}

impl From<FeatureTypeSchema> for FeatureType {
    fn from(value: FeatureTypeSchema) -> Self {
        match value {
            FeatureTypeSchema::Numeric => FeatureType::Numeric,
            FeatureTypeSchema::Categorical => FeatureType::Categorical,
        }
    }
}

impl From<&FeatureSchema> for FeaturesSchema {
    fn from(schema: &FeatureSchema) -> Self {
        FeaturesSchema {
            slots: schema
                .slots()
                .iter()
                .map(|slot| FeatureSlotSchema {
                    name: slot.name.clone(),
                    column: slot.column.clone(),
                    feature_type: slot.feature_type.into(),
                })
                .collect(),
            target: schema.target().to_string(),
        }
    }
}

impl From<FeaturesSchema> for FeatureSchema {
    fn from(schema: FeaturesSchema) -> Self {
        let slots = schema
            .slots
            .into_iter()
            .map(|slot| FeatureSlot {
                name: slot.name,
                column: slot.column,
                feature_type: slot.feature_type.into(),
            })
            .collect();
        FeatureSchema::new(slots, schema.target)
    }
}

// =============================================================================
// Preprocessor
// =============================================================================

impl From<&ColumnTransform> for ColumnTransformSchema {
    fn from(column: &ColumnTransform) -> Self {
        match column {
            ColumnTransform::Scale(scaler) => ColumnTransformSchema::Scale {
                mean: scaler.mean(),
                scale: scaler.scale(),
            },
            ColumnTransform::OneHot(enc) => ColumnTransformSchema::OneHot {
                categories: enc.categories().to_vec(),
            },
        }
    }
}

impl TryFrom<ColumnTransformSchema> for ColumnTransform {
    type Error = ReadError;

    fn try_from(schema: ColumnTransformSchema) -> Result<Self, Self::Error> {
        match schema {
            ColumnTransformSchema::Scale { mean, scale } => {
                if !mean.is_finite() || !scale.is_finite() || scale <= 0.0 {
                    return Err(ReadError::Validation(format!(
                        "invalid scaler (mean {mean}, scale {scale})"
                    )));
                }
                Ok(ColumnTransform::Scale(StandardScaler::new(mean, scale)))
            }
            ColumnTransformSchema::OneHot { categories } => {
                let mut seen = HashSet::with_capacity(categories.len());
                if let Some(dup) = categories.iter().find(|c| !seen.insert(c.as_str())) {
                    return Err(ReadError::Validation(format!("duplicate category {dup:?}")));
                }
                Ok(ColumnTransform::OneHot(OneHotEncoder::from_categories(categories)))
            }
        }
    }
}

impl From<&Preprocessor> for PreprocessorSchema {
    fn from(pre: &Preprocessor) -> Self {
        PreprocessorSchema {
            features: pre.schema().into(),
            columns: pre.columns().iter().map(ColumnTransformSchema::from).collect(),
        }
    }
}

impl TryFrom<PreprocessorSchema> for Preprocessor {
    type Error = ReadError;

    fn try_from(schema: PreprocessorSchema) -> Result<Self, Self::Error> {
        let columns = schema
            .columns
            .into_iter()
            .map(ColumnTransform::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Preprocessor::from_parts(schema.features.into(), columns).map_err(|e| ReadError::Validation(e.to_string()))
    }
}

// =============================================================================
// Model
// =============================================================================

impl From<Objective> for ObjectiveSchema {
    fn from(objective: Objective) -> Self {
        match objective {
            Objective::SquaredLoss => ObjectiveSchema::SquaredLoss,
            Objective::AbsoluteLoss => ObjectiveSchema::AbsoluteLoss,
        }
    }
}

impl From<ObjectiveSchema> for Objective {
    fn from(schema: ObjectiveSchema) -> Self {
        match schema {
            ObjectiveSchema::SquaredLoss => Objective::SquaredLoss,
            ObjectiveSchema::AbsoluteLoss => Objective::AbsoluteLoss,
        }
    }
}

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        ModelMetaSchema {
            num_features: meta.n_features,
            feature_names: meta.feature_names.clone(),
            objective: meta.objective.into(),
        }
    }
}

impl TryFrom<ModelMetaSchema> for ModelMeta {
    type Error = ReadError;

    fn try_from(schema: ModelMetaSchema) -> Result<Self, Self::Error> {
        if let Some(names) = &schema.feature_names {
            if names.len() != schema.num_features {
                return Err(ReadError::Validation(format!(
                    "{} feature names for {} features",
                    names.len(),
                    schema.num_features
                )));
            }
        }
        Ok(ModelMeta {
            n_features: schema.num_features,
            feature_names: schema.feature_names,
            objective: schema.objective.into(),
        })
    }
}

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        TreeSchema {
            num_nodes: tree.n_nodes() as u32,
            split_indices: tree.split_features().to_vec(),
            thresholds: tree.thresholds().iter().map(|&t| f64::from(t)).collect(),
            children_left: tree.left_children().to_vec(),
            children_right: tree.right_children().to_vec(),
            leaf_values: tree.leaf_values().to_vec(),
        }
    }
}

impl TryFrom<TreeSchema> for Tree {
    type Error = ReadError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let n_nodes = schema.num_nodes as usize;
        let lengths = [
            schema.split_indices.len(),
            schema.thresholds.len(),
            schema.children_left.len(),
            schema.children_right.len(),
            schema.leaf_values.len(),
        ];
        if lengths.iter().any(|&len| len != n_nodes) {
            return Err(ReadError::Validation(format!(
                "tree arrays {lengths:?} do not match num_nodes {n_nodes}"
            )));
        }

        // 0 is the root and therefore never a child: it marks "no child".
        let is_leaf: Vec<bool> = schema.children_left.iter().map(|&left| left == 0).collect();

        Ok(Tree::from_parts(
            schema.split_indices,
            schema.thresholds.into_iter().map(|t| t as f32).collect(),
            schema.children_left,
            schema.children_right,
            is_leaf,
            schema.leaf_values,
        ))
    }
}

impl From<&Forest> for ForestSchema {
    fn from(forest: &Forest) -> Self {
        ForestSchema {
            trees: forest.trees().map(TreeSchema::from).collect(),
            base_score: forest.base_score(),
        }
    }
}

impl TryFrom<ForestSchema> for Forest {
    type Error = ReadError;

    fn try_from(schema: ForestSchema) -> Result<Self, Self::Error> {
        let mut forest = Forest::new(schema.base_score);
        for tree in schema.trees {
            forest.push_tree(Tree::try_from(tree)?);
        }
        Ok(forest)
    }
}

impl From<&GBDTModel> for GBDTModelSchema {
    fn from(model: &GBDTModel) -> Self {
        GBDTModelSchema {
            meta: model.meta().into(),
            forest: model.forest().into(),
        }
    }
}

impl TryFrom<GBDTModelSchema> for GBDTModel {
    type Error = ReadError;

    fn try_from(schema: GBDTModelSchema) -> Result<Self, Self::Error> {
        let meta = ModelMeta::try_from(schema.meta)?;
        let forest = Forest::try_from(schema.forest)?;
        GBDTModel::from_parts(forest, meta).map_err(|e| ReadError::Validation(e.to_string()))
    }
}

// =============================================================================
// Pipeline
// =============================================================================

impl From<&SalaryPipeline> for PipelineSchema {
    fn from(pipeline: &SalaryPipeline) -> Self {
        PipelineSchema {
            preprocessor: pipeline.preprocessor().into(),
            model: pipeline.model().into(),
        }
    }
}

impl TryFrom<PipelineSchema> for SalaryPipeline {
    type Error = ReadError;

    fn try_from(schema: PipelineSchema) -> Result<Self, Self::Error> {
        let preprocessor = Preprocessor::try_from(schema.preprocessor)?;
        let model = GBDTModel::try_from(schema.model)?;
        SalaryPipeline::from_parts(preprocessor, model).map_err(|e| ReadError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::TreeBuilder;

    fn stump() -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.add_node();
        let (l, r) = b.split(root, 2, 0.25);
        b.set_leaf(l, -1.5);
        b.set_leaf(r, 2.5);
        b.build()
    }

    #[test]
    fn tree_roundtrip_preserves_structure() {
        let tree = stump();
        let back = Tree::try_from(TreeSchema::from(&tree)).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn tree_length_mismatch_is_rejected() {
        let mut schema = TreeSchema::from(&stump());
        schema.leaf_values.pop();
        assert!(matches!(Tree::try_from(schema), Err(ReadError::Validation(_))));
    }

    #[test]
    fn out_of_range_feature_fails_model_validation() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump());
        let schema = GBDTModelSchema {
            meta: ModelMetaSchema {
                num_features: 2,
                feature_names: None,
                objective: ObjectiveSchema::SquaredLoss,
            },
            forest: (&forest).into(),
        };
        let err = GBDTModel::try_from(schema).unwrap_err();
        assert!(err.to_string().contains("feature 2"), "{err}");
    }

    #[test]
    fn duplicate_categories_are_rejected() {
        let schema = ColumnTransformSchema::OneHot {
            categories: vec!["a".into(), "b".into(), "a".into()],
        };
        assert!(ColumnTransform::try_from(schema).is_err());
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let schema = ColumnTransformSchema::Scale { mean: 1.0, scale: 0.0 };
        assert!(ColumnTransform::try_from(schema).is_err());
    }
}
