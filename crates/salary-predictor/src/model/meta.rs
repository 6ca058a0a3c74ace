//! Model metadata.

use crate::training::Objective;

/// Introspection data stored next to the forest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelMeta {
    /// Number of input features the trees index into.
    pub n_features: usize,
    /// Feature names, if known.
    pub feature_names: Option<Vec<String>>,
    /// Objective the forest was trained with.
    pub objective: Objective,
}

impl ModelMeta {
    pub fn new(n_features: usize, objective: Objective) -> Self {
        Self {
            n_features,
            feature_names: None,
            objective,
        }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        debug_assert_eq!(names.len(), self.n_features);
        self.feature_names = Some(names);
        self
    }
}
