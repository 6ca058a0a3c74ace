//! Gradient histograms.
//!
//! A histogram holds, for every (feature, bin), the sums of gradients and
//! hessians and the row count of the rows in one tree node. Features are laid
//! out back to back using [`BinnedMatrix::feature_offsets`].

use super::binning::BinnedMatrix;
use crate::training::Gradients;
use crate::utils::Parallelism;

/// Accumulated statistics of one bin (or one node).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistBin {
    pub grad: f64,
    pub hess: f64,
    pub count: u32,
}

impl HistBin {
    #[inline]
    pub fn add(&mut self, grad: f32, hess: f32) {
        self.grad += grad as f64;
        self.hess += hess as f64;
        self.count += 1;
    }

    #[inline]
    pub fn merge(&mut self, other: &HistBin) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    #[inline]
    pub fn minus(&self, other: &HistBin) -> HistBin {
        HistBin {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }
}

/// Flat per-node histogram over all features.
#[derive(Clone, Debug)]
pub struct Histogram {
    bins: Vec<HistBin>,
}

impl Histogram {
    pub fn zeros(total_bins: usize) -> Self {
        Self {
            bins: vec![HistBin::default(); total_bins],
        }
    }

    /// Accumulate `rows` into a fresh histogram, one feature per task.
    pub fn build(binned: &BinnedMatrix, rows: &[u32], gradients: &Gradients, parallelism: Parallelism) -> Self {
        let mut hist = Self::zeros(binned.total_bins());
        let offsets = binned.feature_offsets();

        let mut blocks: Vec<(usize, &mut [HistBin])> = Vec::with_capacity(binned.n_features());
        let mut rest = hist.bins.as_mut_slice();
        for f in 0..binned.n_features() {
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(offsets[f + 1] - offsets[f]);
            blocks.push((f, block));
            rest = tail;
        }

        parallelism.maybe_par_for_each(blocks, |(f, block)| {
            let column = binned.column(f);
            for &row in rows {
                let (g, h) = gradients.get(row as usize);
                block[column[row as usize] as usize].add(g, h);
            }
        });

        hist
    }

    /// Bins of feature `f`.
    pub fn feature<'a>(&'a self, binned: &BinnedMatrix, f: usize) -> &'a [HistBin] {
        let offsets = binned.feature_offsets();
        &self.bins[offsets[f]..offsets[f + 1]]
    }

    /// Sibling histogram via the subtraction trick: `self - child`.
    pub fn subtract(mut self, child: &Histogram) -> Histogram {
        debug_assert_eq!(self.bins.len(), child.bins.len());
        for (p, c) in self.bins.iter_mut().zip(&child.bins) {
            *p = p.minus(c);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn setup() -> (BinnedMatrix, Gradients) {
        let x = array![[0.0f32, 5.0], [1.0, 5.0], [0.0, 6.0], [1.0, 7.0]];
        let binned = BinnedMatrix::from_features(x.view(), 256, Parallelism::Sequential);
        let mut grads = Gradients::new(4);
        let (g, h) = grads.pairs_mut();
        g.copy_from_slice(&[1.0, -2.0, 3.0, -4.0]);
        h.copy_from_slice(&[1.0, 1.0, 1.0, 1.0]);
        (binned, grads)
    }

    #[test]
    fn build_accumulates_per_bin() {
        let (binned, grads) = setup();
        let hist = Histogram::build(&binned, &[0, 1, 2, 3], &grads, Parallelism::Sequential);

        let f0 = hist.feature(&binned, 0);
        assert_eq!(f0[0], HistBin { grad: 4.0, hess: 2.0, count: 2 });
        assert_eq!(f0[1], HistBin { grad: -6.0, hess: 2.0, count: 2 });

        let f1 = hist.feature(&binned, 1);
        assert_eq!(f1.len(), 3);
        assert_eq!(f1[0].grad, -1.0);
        assert_eq!(f1[2].count, 1);
    }

    #[test]
    fn subtraction_matches_direct_build() {
        let (binned, grads) = setup();
        let parent = Histogram::build(&binned, &[0, 1, 2, 3], &grads, Parallelism::Parallel);
        let left = Histogram::build(&binned, &[0, 2], &grads, Parallelism::Sequential);
        let right = Histogram::build(&binned, &[1, 3], &grads, Parallelism::Sequential);

        let derived = parent.subtract(&left);
        for f in 0..binned.n_features() {
            assert_eq!(derived.feature(&binned, f), right.feature(&binned, f));
        }
    }
}
