//! Feature schema definitions.
//!
//! A [`FeatureSchema`] is the ordered list of input slots the pipeline
//! consumes. The order is significant: rows, preprocessor columns and the
//! persisted artifact all follow it.

/// Logical feature types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FeatureType {
    /// Continuous numeric feature, read as `f64`.
    #[default]
    Numeric,

    /// Categorical feature, read as a label string.
    Categorical,
}

impl FeatureType {
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureType::Categorical)
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FeatureType::Numeric)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Numeric => "numeric",
            FeatureType::Categorical => "categorical",
        }
    }
}

/// One input slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSlot {
    /// Name used in requests, the encoding table and the artifact.
    pub name: String,
    /// Header of the corresponding column in the training CSV.
    pub column: String,
    pub feature_type: FeatureType,
}

impl FeatureSlot {
    pub fn numeric(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            feature_type: FeatureType::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            feature_type: FeatureType::Categorical,
        }
    }
}

/// Ordered feature slots plus the target column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    slots: Vec<FeatureSlot>,
    target: String,
}

impl FeatureSchema {
    pub fn new(slots: Vec<FeatureSlot>, target: impl Into<String>) -> Self {
        Self {
            slots,
            target: target.into(),
        }
    }

    /// The salary schema: `Age`, `Gender`, `Education_Level`, `Job_Title`,
    /// `Years_of_Experience`, predicting `Salary`.
    pub fn salary() -> Self {
        Self::new(
            vec![
                FeatureSlot::numeric("Age", "Age"),
                FeatureSlot::categorical("Gender", "Gender"),
                FeatureSlot::categorical("Education_Level", "Education Level"),
                FeatureSlot::categorical("Job_Title", "Job Title"),
                FeatureSlot::numeric("Years_of_Experience", "Years of Experience"),
            ],
            "Salary",
        )
    }

    pub fn n_features(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&FeatureSlot> {
        self.slots.get(index)
    }

    /// Index of the slot with the given request name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// Target column header.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Slots of categorical type, in schema order.
    pub fn categorical_slots(&self) -> impl Iterator<Item = &FeatureSlot> {
        self.slots.iter().filter(|s| s.feature_type.is_categorical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_schema_order_is_fixed() {
        let schema = FeatureSchema::salary();
        let names: Vec<_> = schema.slots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["Age", "Gender", "Education_Level", "Job_Title", "Years_of_Experience"]
        );
        assert_eq!(schema.target(), "Salary");
        assert_eq!(schema.position("Job_Title"), Some(3));
        assert_eq!(schema.position("Salary"), None);
    }

    #[test]
    fn categorical_slots_skip_numeric() {
        let schema = FeatureSchema::salary();
        let cats: Vec<_> = schema.categorical_slots().map(|s| s.column.as_str()).collect();
        assert_eq!(cats, ["Gender", "Education Level", "Job Title"]);
    }
}
