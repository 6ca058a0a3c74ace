//! One-hot encoding for categorical columns.

use std::collections::HashMap;

/// Maps each known label to its own output column.
///
/// Categories keep the order in which they were first seen during fitting;
/// a label's position is its code. Unknown labels encode as all zeros.
#[derive(Clone, Debug)]
pub struct OneHotEncoder {
    categories: Vec<String>,
    index: HashMap<String, usize>,
}

impl OneHotEncoder {
    /// Build from an ordered category list. Duplicates keep their first position.
    pub fn from_categories(categories: Vec<String>) -> Self {
        let mut unique = Vec::with_capacity(categories.len());
        let mut index = HashMap::with_capacity(categories.len());
        for label in categories {
            if !index.contains_key(&label) {
                index.insert(label.clone(), unique.len());
                unique.push(label);
            }
        }
        Self {
            categories: unique,
            index,
        }
    }

    /// Fit on a column of labels, in first-appearance order.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_categories(labels.into_iter().map(str::to_string).collect())
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Write the encoding of `label` into `out` (length [`width`](Self::width)).
    pub fn transform_into(&self, label: &str, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.width());
        out.fill(0.0);
        if let Some(pos) = self.position(label) {
            out[pos] = 1.0;
        }
    }
}

impl PartialEq for OneHotEncoder {
    fn eq(&self, other: &Self) -> bool {
        self.categories == other.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_first_appearance() {
        let enc = OneHotEncoder::fit(["Male", "Female", "Male", "Other"]);
        assert_eq!(enc.categories(), ["Male", "Female", "Other"]);
        assert_eq!(enc.position("Female"), Some(1));
        assert_eq!(enc.position("female"), None);
    }

    #[test]
    fn unknown_label_encodes_as_zeros() {
        let enc = OneHotEncoder::fit(["a", "b", "c"]);
        let mut out = vec![9.0; 3];
        enc.transform_into("b", &mut out);
        assert_eq!(out, vec![0.0, 1.0, 0.0]);
        enc.transform_into("zzz", &mut out);
        assert_eq!(out, vec![0.0, 0.0, 0.0]);
    }
}
