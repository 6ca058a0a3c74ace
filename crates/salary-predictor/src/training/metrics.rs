//! Regression metrics.

/// An evaluation metric over predictions and targets.
pub trait MetricFn: Send + Sync {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64;

    fn higher_is_better(&self) -> bool;

    fn name(&self) -> &'static str;
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(p, y)| (p - y) * (p - y))
            .sum();
        (sum_sq / targets.len() as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
///
/// Lower is better. More robust to outliers than RMSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum_abs: f64 = predictions.iter().zip(targets).map(|(p, y)| (p - y).abs()).sum();
        sum_abs / targets.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// R² (coefficient of determination)
// =============================================================================

/// `1 - SS_res / SS_tot`. Higher is better; constant targets give 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct R2;

impl MetricFn for R2 {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let ss_tot: f64 = targets.iter().map(|y| (y - mean) * (y - mean)).sum();
        if ss_tot == 0.0 {
            return 0.0;
        }
        let ss_res: f64 = predictions.iter().zip(targets).map(|(p, y)| (y - p) * (y - p)).sum();
        1.0 - ss_res / ss_tot
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

// =============================================================================
// Metric enum
// =============================================================================

/// Metric selection for evaluation during training.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Rmse,
    Mae,
    R2,
}

impl Metric {
    pub fn rmse() -> Self {
        Metric::Rmse
    }

    pub fn mae() -> Self {
        Metric::Mae
    }

    pub fn r2() -> Self {
        Metric::R2
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        match self {
            Metric::Rmse => Rmse.compute(predictions, targets),
            Metric::Mae => Mae.compute(predictions, targets),
            Metric::R2 => R2.compute(predictions, targets),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Metric::Rmse => Rmse.higher_is_better(),
            Metric::Mae => Mae.higher_is_better(),
            Metric::R2 => R2.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Metric::Rmse => Rmse.name(),
            Metric::Mae => Mae.name(),
            Metric::R2 => R2.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Metric::Rmse, 0.5)]
    #[case(Metric::Mae, 0.25)]
    #[case(Metric::R2, 0.95)]
    fn metric_values(#[case] metric: Metric, #[case] expected: f64) {
        let preds = [0.0, 2.0, 4.0, 5.0];
        let targets = [0.0, 2.0, 4.0, 6.0];
        assert_relative_eq!(metric.compute(&preds, &targets), expected, epsilon = 1e-12);
    }

    #[test]
    fn perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(Rmse.compute(&y, &y), 0.0);
        assert_eq!(R2.compute(&y, &y), 1.0);
    }

    #[test]
    fn direction() {
        assert!(!Metric::Rmse.higher_is_better());
        assert!(Metric::R2.higher_is_better());
    }
}
