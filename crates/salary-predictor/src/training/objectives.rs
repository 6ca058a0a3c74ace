//! Regression objectives.
//!
//! An objective supplies the initial prediction (base score) and the
//! per-row gradients the trees are fitted to.

use crate::utils::median;

/// A differentiable training loss.
pub trait ObjectiveFn: Send + Sync {
    /// Constant prediction that minimises the loss over `targets`.
    fn base_score(&self, targets: &[f64]) -> f64;

    /// Fill `grads`/`hess` for the current predictions.
    fn compute_gradients(&self, predictions: &[f64], targets: &[f64], grads: &mut [f32], hess: &mut [f32]);

    fn name(&self) -> &'static str;
}

// =============================================================================
// Squared loss
// =============================================================================

/// `0.5 * (pred - y)²`. Base score is the mean target.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn base_score(&self, targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        targets.iter().sum::<f64>() / targets.len() as f64
    }

    fn compute_gradients(&self, predictions: &[f64], targets: &[f64], grads: &mut [f32], hess: &mut [f32]) {
        for (((g, h), &p), &y) in grads.iter_mut().zip(hess.iter_mut()).zip(predictions).zip(targets) {
            *g = (p - y) as f32;
            *h = 1.0;
        }
    }

    fn name(&self) -> &'static str {
        "squared_error"
    }
}

// =============================================================================
// Absolute loss
// =============================================================================

/// `|pred - y|`. Base score is the median target; the hessian is fixed at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLoss;

impl ObjectiveFn for AbsoluteLoss {
    fn base_score(&self, targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        median(targets)
    }

    fn compute_gradients(&self, predictions: &[f64], targets: &[f64], grads: &mut [f32], hess: &mut [f32]) {
        for (((g, h), &p), &y) in grads.iter_mut().zip(hess.iter_mut()).zip(predictions).zip(targets) {
            let diff = p - y;
            *g = if diff > 0.0 {
                1.0
            } else if diff < 0.0 {
                -1.0
            } else {
                0.0
            };
            *h = 1.0;
        }
    }

    fn name(&self) -> &'static str {
        "absolute_error"
    }
}

// =============================================================================
// Objective enum
// =============================================================================

/// Training objective selected in the model config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Objective {
    #[default]
    SquaredLoss,
    AbsoluteLoss,
}

impl Objective {
    pub fn squared() -> Self {
        Objective::SquaredLoss
    }

    pub fn absolute() -> Self {
        Objective::AbsoluteLoss
    }

    /// Parse the name produced by [`ObjectiveFn::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "squared_error" => Some(Objective::SquaredLoss),
            "absolute_error" => Some(Objective::AbsoluteLoss),
            _ => None,
        }
    }
}

impl ObjectiveFn for Objective {
    fn base_score(&self, targets: &[f64]) -> f64 {
        match self {
            Objective::SquaredLoss => SquaredLoss.base_score(targets),
            Objective::AbsoluteLoss => AbsoluteLoss.base_score(targets),
        }
    }

    fn compute_gradients(&self, predictions: &[f64], targets: &[f64], grads: &mut [f32], hess: &mut [f32]) {
        match self {
            Objective::SquaredLoss => SquaredLoss.compute_gradients(predictions, targets, grads, hess),
            Objective::AbsoluteLoss => AbsoluteLoss.compute_gradients(predictions, targets, grads, hess),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Objective::SquaredLoss => SquaredLoss.name(),
            Objective::AbsoluteLoss => AbsoluteLoss.name(),
        }
    }
}
