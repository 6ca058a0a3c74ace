//! Raw (pre-encoding) feature values and labeled datasets.

use std::fmt;

/// A single raw feature value.
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            FeatureValue::Numeric(_) => None,
            FeatureValue::Categorical(s) => Some(s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Numeric(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Categorical(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Categorical(value)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{v}"),
            FeatureValue::Categorical(s) => write!(f, "'{s}'"),
        }
    }
}

/// One row of raw values, in schema order.
pub type Row = Vec<FeatureValue>;

/// Labeled rows produced by the CSV loader.
#[derive(Clone, Debug, Default)]
pub struct SalaryDataset {
    pub rows: Vec<Row>,
    pub targets: Vec<f64>,
}

impl SalaryDataset {
    pub fn new(rows: Vec<Row>, targets: Vec<f64>) -> Self {
        debug_assert_eq!(rows.len(), targets.len());
        Self { rows, targets }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gather a subset by row index (order preserved).
    pub fn select(&self, indices: &[usize]) -> SalaryDataset {
        SalaryDataset {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_preserves_order() {
        let ds = SalaryDataset::new(
            vec![vec![1.0.into()], vec![2.0.into()], vec![3.0.into()]],
            vec![10.0, 20.0, 30.0],
        );
        let sub = ds.select(&[2, 0]);
        assert_eq!(sub.targets, vec![30.0, 10.0]);
        assert_eq!(sub.rows[0][0], FeatureValue::Numeric(3.0));
    }

    #[test]
    fn display_quotes_labels() {
        assert_eq!(FeatureValue::from("Male").to_string(), "'Male'");
        assert_eq!(FeatureValue::from(32.0).to_string(), "32");
    }
}
