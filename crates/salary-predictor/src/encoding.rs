//! Categorical encoding table.
//!
//! Maps each categorical feature name to its known labels. A label's code is
//! its position in the feature's label list, fixed at training time.
//!
//! The JSON form is an object of `feature -> [labels]`, with features and
//! labels both kept in order:
//!
//! ```json
//! {
//!     "Gender": ["Male", "Female"],
//!     "Education_Level": ["Bachelor's", "Master's", "PhD"]
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors building an [`EncodingTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("duplicate categorical feature: {0}")]
    DuplicateFeature(String),

    #[error("duplicate label {label:?} for feature {feature}")]
    DuplicateLabel { feature: String, label: String },
}

/// Labels of one categorical feature.
#[derive(Clone, Debug)]
struct FeatureEncoding {
    name: String,
    labels: Vec<String>,
    codes: HashMap<String, u32>,
}

impl FeatureEncoding {
    fn new(name: String, labels: Vec<String>) -> Result<Self, EncodingError> {
        let mut codes = HashMap::with_capacity(labels.len());
        for (code, label) in labels.iter().enumerate() {
            if codes.insert(label.clone(), code as u32).is_some() {
                return Err(EncodingError::DuplicateLabel {
                    feature: name,
                    label: label.clone(),
                });
            }
        }
        Ok(Self { name, labels, codes })
    }
}

/// Ordered `feature -> label -> code` mapping.
///
/// Immutable once built; lookups are exact and case-sensitive.
#[derive(Clone, Debug, Default)]
pub struct EncodingTable {
    features: Vec<FeatureEncoding>,
}

impl EncodingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature with its labels in code order.
    pub fn insert(
        &mut self,
        feature: impl Into<String>,
        labels: Vec<String>,
    ) -> Result<(), EncodingError> {
        let feature = feature.into();
        if self.find(&feature).is_some() {
            return Err(EncodingError::DuplicateFeature(feature));
        }
        self.features.push(FeatureEncoding::new(feature, labels)?);
        Ok(())
    }

    /// Code of `label` for `feature`, if both are known.
    pub fn code(&self, feature: &str, label: &str) -> Option<u32> {
        self.find(feature)?.codes.get(label).copied()
    }

    /// Known labels of `feature`, in code order.
    pub fn labels(&self, feature: &str) -> Option<&[String]> {
        self.find(feature).map(|f| f.labels.as_slice())
    }

    pub fn contains_feature(&self, feature: &str) -> bool {
        self.find(feature).is_some()
    }

    /// Iterate `(feature, labels)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.features
            .iter()
            .map(|f| (f.name.as_str(), f.labels.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn find(&self, feature: &str) -> Option<&FeatureEncoding> {
        self.features.iter().find(|f| f.name == feature)
    }
}

impl PartialEq for EncodingTable {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Serialize for EncodingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.features.len()))?;
        for (name, labels) in self.iter() {
            map.serialize_entry(name, labels)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EncodingTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = EncodingTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of feature names to label lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = EncodingTable::new();
                while let Some((name, labels)) = access.next_entry::<String, Vec<String>>()? {
                    table.insert(name, labels).map_err(serde::de::Error::custom)?;
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
