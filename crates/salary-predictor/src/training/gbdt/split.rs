//! Gain computation and greedy split search.

use super::binning::BinnedMatrix;
use super::histogram::{HistBin, Histogram};
use crate::utils::Parallelism;

// =============================================================================
// Gain Parameters
// =============================================================================

/// Parameters for split gain computation and leaf weight calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f64,
    /// L1 regularization (alpha).
    pub reg_alpha: f64,
    /// Minimum split gain (gamma).
    pub min_gain: f64,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f64,
    /// Minimum samples per child.
    pub min_samples_leaf: u32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl GainParams {
    /// Gradient sum after L1 soft-thresholding.
    #[inline]
    fn threshold_l1(&self, grad: f64) -> f64 {
        if grad > self.reg_alpha {
            grad - self.reg_alpha
        } else if grad < -self.reg_alpha {
            grad + self.reg_alpha
        } else {
            0.0
        }
    }

    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        let g = self.threshold_l1(grad);
        g * g / (hess + self.reg_lambda)
    }

    /// Split gain using the XGBoost formula.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    ///
    /// with `G` soft-thresholded by `α` when L1 regularization is set.
    #[inline]
    pub fn compute_gain(&self, left: &HistBin, right: &HistBin, parent: &HistBin) -> f64 {
        0.5 * (self.score(left.grad, left.hess) + self.score(right.grad, right.hess)
            - self.score(parent.grad, parent.hess))
            - self.min_gain
    }

    /// Check if a split satisfies minimum child constraints.
    #[inline]
    pub fn is_valid_split(&self, left: &HistBin, right: &HistBin) -> bool {
        left.hess >= self.min_child_weight
            && right.hess >= self.min_child_weight
            && left.count >= self.min_samples_leaf.max(1)
            && right.count >= self.min_samples_leaf.max(1)
    }

    /// Optimal leaf weight `-G / (H + λ)` (L1 soft-thresholded).
    #[inline]
    pub fn compute_leaf_weight(&self, grad: f64, hess: f64) -> f64 {
        let denom = hess + self.reg_lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        -self.threshold_l1(grad) / denom
    }
}

// =============================================================================
// Split search
// =============================================================================

/// Best split of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    /// Last bin that goes left.
    pub bin: u8,
    /// Raw threshold: rows with `value < threshold` go left.
    pub threshold: f32,
    pub gain: f64,
    pub left: HistBin,
    pub right: HistBin,
}

/// Find the highest-gain split over all features.
///
/// Only splits with positive gain (after `min_gain`) are returned. Ties are
/// broken towards the lowest feature index, then the lowest bin.
pub fn find_best_split(
    hist: &Histogram,
    binned: &BinnedMatrix,
    parent: &HistBin,
    params: &GainParams,
    parallelism: Parallelism,
) -> Option<SplitInfo> {
    let per_feature = parallelism.maybe_par_map(0..binned.n_features(), |f| {
        best_split_for_feature(hist.feature(binned, f), f, binned, parent, params)
    });

    let mut best: Option<SplitInfo> = None;
    for candidate in per_feature.into_iter().flatten() {
        if best.as_ref().map_or(true, |b| candidate.gain > b.gain) {
            best = Some(candidate);
        }
    }
    best
}

fn best_split_for_feature(
    bins: &[HistBin],
    feature: usize,
    binned: &BinnedMatrix,
    parent: &HistBin,
    params: &GainParams,
) -> Option<SplitInfo> {
    let mut best: Option<SplitInfo> = None;
    let mut left = HistBin::default();

    // The last bin cannot be a split point: nothing would go right.
    for (bin, stats) in bins.iter().enumerate().take(bins.len().saturating_sub(1)) {
        left.merge(stats);
        let right = parent.minus(&left);
        if !params.is_valid_split(&left, &right) {
            continue;
        }
        let gain = params.compute_gain(&left, &right, parent);
        if gain > 0.0 && best.as_ref().map_or(true, |b| gain > b.gain) {
            best = Some(SplitInfo {
                feature: feature as u32,
                bin: bin as u8,
                threshold: binned.mapper(feature).threshold(bin),
                gain,
                left,
                right,
            });
        }
    }
    best
}
