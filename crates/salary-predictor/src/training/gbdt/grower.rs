//! Tree grower for gradient boosting.
//!
//! Grows one depth-wise tree from gradient and hessian vectors using
//! histogram split search, row partitioning and the subtraction trick: only
//! the smaller child of each split gets a freshly built histogram, the larger
//! one is derived as `parent - smaller`.

use super::binning::BinnedMatrix;
use super::histogram::{HistBin, Histogram};
use super::partition::RowPartitioner;
use super::split::{find_best_split, GainParams};
use crate::repr::{NodeId, Tree, TreeBuilder};
use crate::training::Gradients;
use crate::utils::Parallelism;

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    pub gain: GainParams,
    /// Shrinkage applied to every leaf weight.
    pub learning_rate: f64,
    /// Maximum depth; the root is depth 0.
    pub max_depth: u32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.1,
            max_depth: 4,
        }
    }
}

/// A node waiting to be split.
struct Candidate {
    node: NodeId,
    leaf: usize,
    hist: Histogram,
    stats: HistBin,
}

/// Grows trees over one binned training matrix.
pub struct TreeGrower<'a> {
    binned: &'a BinnedMatrix,
    params: GrowerParams,
    parallelism: Parallelism,
    partitioner: RowPartitioner,
}

impl<'a> TreeGrower<'a> {
    pub fn new(binned: &'a BinnedMatrix, params: GrowerParams, parallelism: Parallelism) -> Self {
        Self {
            binned,
            params,
            parallelism,
            partitioner: RowPartitioner::new(),
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow a tree on `rows` (all rows, or a subsample).
    pub fn grow(&mut self, gradients: &Gradients, rows: &[u32]) -> Tree {
        let mut builder = TreeBuilder::new();
        let root = builder.add_node();

        self.partitioner.reset(rows);
        let mut stats = HistBin::default();
        for &row in rows {
            let (g, h) = gradients.get(row as usize);
            stats.add(g, h);
        }

        if self.params.max_depth == 0 || rows.is_empty() {
            builder.set_leaf(root, self.leaf_value(&stats));
            return builder.build();
        }

        let hist = Histogram::build(self.binned, rows, gradients, self.parallelism);
        let mut frontier = vec![Candidate {
            node: root,
            leaf: 0,
            hist,
            stats,
        }];

        for depth in 0..self.params.max_depth {
            let expand_children = depth + 1 < self.params.max_depth;
            let mut next = Vec::with_capacity(frontier.len() * 2);

            for cand in frontier {
                let split = find_best_split(
                    &cand.hist,
                    self.binned,
                    &cand.stats,
                    &self.params.gain,
                    self.parallelism,
                );
                let Some(split) = split else {
                    builder.set_leaf(cand.node, self.leaf_value(&cand.stats));
                    continue;
                };

                let (left_node, right_node) = builder.split(cand.node, split.feature, split.threshold);
                let right_leaf =
                    self.partitioner
                        .split(cand.leaf, self.binned.column(split.feature as usize), split.bin);

                if !expand_children {
                    builder.set_leaf(left_node, self.leaf_value(&split.left));
                    builder.set_leaf(right_node, self.leaf_value(&split.right));
                    continue;
                }

                let (left_hist, right_hist) = if split.left.count <= split.right.count {
                    let small = self.build_histogram(gradients, cand.leaf);
                    let large = cand.hist.subtract(&small);
                    (small, large)
                } else {
                    let small = self.build_histogram(gradients, right_leaf);
                    let large = cand.hist.subtract(&small);
                    (large, small)
                };

                next.push(Candidate {
                    node: left_node,
                    leaf: cand.leaf,
                    hist: left_hist,
                    stats: split.left,
                });
                next.push(Candidate {
                    node: right_node,
                    leaf: right_leaf,
                    hist: right_hist,
                    stats: split.right,
                });
            }

            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }

        for cand in frontier {
            builder.set_leaf(cand.node, self.leaf_value(&cand.stats));
        }
        builder.build()
    }

    fn build_histogram(&self, gradients: &Gradients, leaf: usize) -> Histogram {
        Histogram::build(
            self.binned,
            self.partitioner.leaf_rows(leaf),
            gradients,
            self.parallelism,
        )
    }

    fn leaf_value(&self, stats: &HistBin) -> f64 {
        self.params.learning_rate * self.params.gain.compute_leaf_weight(stats.grad, stats.hess)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array2;

    use super::*;

    fn gradients(g: &[f32]) -> Gradients {
        let mut grads = Gradients::new(g.len());
        let (gs, hs) = grads.pairs_mut();
        gs.copy_from_slice(g);
        hs.fill(1.0);
        grads
    }

    fn step_data() -> (Array2<f32>, Gradients) {
        // Target jumps at x = 5; gradients are `0 - y` for a zero prediction.
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f32);
        let g: Vec<f32> = (0..10).map(|i| if i < 5 { -1.0 } else { -3.0 }).collect();
        (x, gradients(&g))
    }

    #[test]
    fn depth_one_finds_the_step() {
        let (x, grads) = step_data();
        let binned = BinnedMatrix::from_features(x.view(), 256, Parallelism::Sequential);
        let params = GrowerParams {
            gain: GainParams {
                reg_lambda: 0.0,
                ..Default::default()
            },
            learning_rate: 1.0,
            max_depth: 1,
        };
        let mut grower = TreeGrower::new(&binned, params, Parallelism::Sequential);
        let rows: Vec<u32> = (0..10).collect();
        let tree = grower.grow(&grads, &rows);

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.threshold(0), 4.5);
        assert_relative_eq!(tree.predict_row(&[0.0]), 1.0);
        assert_relative_eq!(tree.predict_row(&[9.0]), 3.0);
    }

    #[test]
    fn respects_max_depth_and_validates() {
        let x = Array2::from_shape_fn((64, 2), |(i, j)| ((i * (j + 3)) % 17) as f32);
        let g: Vec<f32> = (0..64).map(|i| ((i * 7) % 11) as f32 - 5.0).collect();
        let grads = gradients(&g);
        let binned = BinnedMatrix::from_features(x.view(), 256, Parallelism::Sequential);
        let rows: Vec<u32> = (0..64).collect();

        for max_depth in [0, 1, 2, 4] {
            let params = GrowerParams {
                max_depth,
                ..Default::default()
            };
            let mut grower = TreeGrower::new(&binned, params, Parallelism::Parallel);
            let tree = grower.grow(&grads, &rows);
            assert!(tree.depth() <= max_depth as usize);
            assert_eq!(tree.validate(2), Ok(()));
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let x = Array2::from_shape_fn((50, 3), |(i, j)| ((i * 13 + j * 7) % 23) as f32);
        let g: Vec<f32> = (0..50).map(|i| ((i * 5) % 9) as f32 - 4.0).collect();
        let grads = gradients(&g);
        let binned = BinnedMatrix::from_features(x.view(), 256, Parallelism::Sequential);
        let rows: Vec<u32> = (0..50).collect();

        let seq = TreeGrower::new(&binned, GrowerParams::default(), Parallelism::Sequential).grow(&grads, &rows);
        let par = TreeGrower::new(&binned, GrowerParams::default(), Parallelism::Parallel).grow(&grads, &rows);
        assert_eq!(seq, par);
    }

    #[test]
    fn subsampled_rows_only() {
        let (x, grads) = step_data();
        let binned = BinnedMatrix::from_features(x.view(), 256, Parallelism::Sequential);
        let mut grower = TreeGrower::new(&binned, GrowerParams::default(), Parallelism::Sequential);
        // Only rows from the low side: no useful split exists.
        let tree = grower.grow(&grads, &[0, 1, 2, 3]);
        assert_eq!(tree.n_nodes(), 1);
        assert_relative_eq!(tree.leaf_value(0), 0.1 * 4.0 / 5.0);
    }
}
