//! Standard scaling for numeric columns.

/// Centers a column on its mean and divides by its standard deviation.
///
/// The deviation is the population one (`ddof = 0`). Constant columns get a
/// scale of `1.0` so they map to zero instead of dividing by zero.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    /// Fit on a column of finite values.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::new(0.0, 1.0);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std = var.sqrt();
        let scale = if std > f64::EPSILON * mean.abs().max(1.0) { std } else { 1.0 };
        Self::new(mean, scale)
    }

    #[inline]
    pub fn transform(&self, value: f64) -> f32 {
        ((value - self.mean) / self.scale) as f32
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn fit_uses_population_std() {
        let scaler = StandardScaler::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(scaler.mean(), 5.0);
        assert_relative_eq!(scaler.scale(), 2.0);
        assert_relative_eq!(scaler.transform(9.0), 2.0);
        assert_relative_eq!(scaler.transform(1.0), -2.0);
    }

    #[test]
    fn constant_column_has_unit_scale() {
        let scaler = StandardScaler::fit(&[3.0, 3.0, 3.0]);
        assert_eq!(scaler.scale(), 1.0);
        assert_eq!(scaler.transform(3.0), 0.0);
        assert_eq!(scaler.transform(4.0), 1.0);
    }
}
