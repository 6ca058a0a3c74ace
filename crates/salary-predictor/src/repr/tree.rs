//! Canonical tree representation (SoA) and its construction.
//!
//! This module provides:
//! - [`Tree`]: immutable SoA tree storage for traversal
//! - [`TreeBuilder`]: incremental construction used by the grower
//! - [`TreeValidationError`]: structural validation errors
//!
//! Splits are numeric only: a row goes left iff `value < threshold`.

use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("node arrays have mismatched lengths")]
    LengthMismatch,

    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },

    #[error("node {node} reached by more than one path")]
    DuplicateVisit { node: NodeId },

    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },

    #[error("node {node} splits on feature {feature}, model has {n_features}")]
    FeatureOutOfRange {
        node: NodeId,
        feature: u32,
        n_features: usize,
    },

    #[error("node {node} has a non-finite threshold or leaf value")]
    NonFiniteValue { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
///
/// Child indices are local to this tree (0 = root). For leaf nodes the split
/// arrays hold placeholders; for split nodes `leaf_value` holds `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_feature: Box<[u32]>,
    threshold: Box<[f32]>,
    left: Box<[NodeId]>,
    right: Box<[NodeId]>,
    is_leaf: Box<[bool]>,
    leaf_value: Box<[f64]>,
}

impl Tree {
    /// Create a tree from raw arrays. Call [`validate`](Self::validate) before
    /// traversing a tree that did not come from [`TreeBuilder`].
    pub fn from_parts(
        split_feature: Vec<u32>,
        threshold: Vec<f32>,
        left: Vec<NodeId>,
        right: Vec<NodeId>,
        is_leaf: Vec<bool>,
        leaf_value: Vec<f64>,
    ) -> Self {
        Self {
            split_feature: split_feature.into_boxed_slice(),
            threshold: threshold.into_boxed_slice(),
            left: left.into_boxed_slice(),
            right: right.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_value: leaf_value.into_boxed_slice(),
        }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f64) -> Self {
        Self::from_parts(vec![0], vec![0.0], vec![0], vec![0], vec![true], vec![value])
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_feature(&self, node: NodeId) -> u32 {
        self.split_feature[node as usize]
    }

    #[inline]
    pub fn threshold(&self, node: NodeId) -> f32 {
        self.threshold[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_value[node as usize]
    }

    pub fn split_features(&self) -> &[u32] {
        &self.split_feature
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.threshold
    }

    pub fn left_children(&self) -> &[NodeId] {
        &self.left
    }

    pub fn right_children(&self) -> &[NodeId] {
        &self.right
    }

    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn leaf_values(&self) -> &[f64] {
        &self.leaf_value
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    /// Walk from the root to the leaf reached by `features`.
    #[inline]
    pub fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let value = features[self.split_feature(node) as usize];
            node = if value < self.threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f64 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    /// Validate structure: every node reachable exactly once from the root,
    /// children in bounds, split features below `n_features`, finite values.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }
        if [
            self.split_feature.len(),
            self.threshold.len(),
            self.left.len(),
            self.right.len(),
            self.leaf_value.len(),
        ]
        .iter()
        .any(|&len| len != n_nodes)
        {
            return Err(TreeValidationError::LengthMismatch);
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, bool)> = vec![(0, false)];

        while let Some((node, finished)) = stack.pop() {
            let idx = node as usize;
            if finished {
                color[idx] = 2;
                continue;
            }
            match color[idx] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }
            color[idx] = 1;
            stack.push((node, true));

            if self.is_leaf(node) {
                if !self.leaf_value(node).is_finite() {
                    return Err(TreeValidationError::NonFiniteValue { node });
                }
                continue;
            }

            let feature = self.split_feature(node);
            if feature as usize >= n_features {
                return Err(TreeValidationError::FeatureOutOfRange {
                    node,
                    feature,
                    n_features,
                });
            }
            if !self.threshold(node).is_finite() {
                return Err(TreeValidationError::NonFiniteValue { node });
            }

            let (left, right) = (self.left_child(node), self.right_child(node));
            if left == node || right == node {
                return Err(TreeValidationError::SelfLoop { node });
            }
            for (side, child) in [("left", left), ("right", right)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
            }
            stack.push((right, false));
            stack.push((left, false));
        }

        if let Some(node) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode { node: node as NodeId });
        }
        Ok(())
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Incremental tree construction.
///
/// Nodes are allocated first and filled in later, which lets the grower
/// allocate both children of a split before either is expanded.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    split_feature: Vec<u32>,
    threshold: Vec<f32>,
    left: Vec<NodeId>,
    right: Vec<NodeId>,
    is_leaf: Vec<bool>,
    leaf_value: Vec<f64>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, initially a zero-valued leaf.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_feature.push(0);
        self.threshold.push(0.0);
        self.left.push(0);
        self.right.push(0);
        self.is_leaf.push(true);
        self.leaf_value.push(0.0);
        id
    }

    /// Turn `node` into a split and allocate its two children.
    ///
    /// Returns `(left, right)`.
    pub fn split(&mut self, node: NodeId, feature: u32, threshold: f32) -> (NodeId, NodeId) {
        let left = self.add_node();
        let right = self.add_node();
        let idx = node as usize;
        self.split_feature[idx] = feature;
        self.threshold[idx] = threshold;
        self.left[idx] = left;
        self.right[idx] = right;
        self.is_leaf[idx] = false;
        self.leaf_value[idx] = 0.0;
        (left, right)
    }

    pub fn set_leaf(&mut self, node: NodeId, value: f64) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_value[idx] = value;
    }

    pub fn build(self) -> Tree {
        Tree::from_parts(
            self.split_feature,
            self.threshold,
            self.left,
            self.right,
            self.is_leaf,
            self.leaf_value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `f0 < 0.5 ? (f1 < 2.0 ? 1.0 : 2.0) : 3.0`
    fn two_level_tree() -> Tree {
        let mut b = TreeBuilder::new();
        let root = b.add_node();
        let (l, r) = b.split(root, 0, 0.5);
        let (ll, lr) = b.split(l, 1, 2.0);
        b.set_leaf(ll, 1.0);
        b.set_leaf(lr, 2.0);
        b.set_leaf(r, 3.0);
        b.build()
    }

    #[test]
    fn traversal_goes_left_below_threshold() {
        let tree = two_level_tree();
        assert_eq!(tree.predict_row(&[0.1, 1.0]), 1.0);
        assert_eq!(tree.predict_row(&[0.1, 2.0]), 2.0);
        assert_eq!(tree.predict_row(&[0.5, 0.0]), 3.0);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn builder_output_validates() {
        assert_eq!(two_level_tree().validate(2), Ok(()));
        assert_eq!(Tree::leaf(4.2).validate(0), Ok(()));
    }

    #[test]
    fn validate_rejects_feature_out_of_range() {
        let err = two_level_tree().validate(1).unwrap_err();
        assert!(matches!(err, TreeValidationError::FeatureOutOfRange { feature: 1, .. }));
    }

    #[test]
    fn validate_rejects_bad_children() {
        let tree = Tree::from_parts(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![7, 0, 0],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
        );
        assert!(matches!(
            tree.validate(1),
            Err(TreeValidationError::ChildOutOfBounds { side: "right", child: 7, .. })
        ));

        let dag = Tree::from_parts(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![1, 0, 0],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
        );
        assert!(matches!(dag.validate(1), Err(TreeValidationError::DuplicateVisit { node: 1 })));
    }

    #[test]
    fn validate_rejects_unreachable_and_mismatched() {
        let orphan = Tree::from_parts(
            vec![0, 0],
            vec![0.0, 0.0],
            vec![0, 0],
            vec![0, 0],
            vec![true, true],
            vec![1.0, 2.0],
        );
        assert_eq!(orphan.validate(1), Err(TreeValidationError::UnreachableNode { node: 1 }));

        let ragged = Tree::from_parts(vec![0], vec![0.0], vec![0], vec![0], vec![true], vec![]);
        assert_eq!(ragged.validate(1), Err(TreeValidationError::LengthMismatch));
    }

    #[test]
    fn validate_rejects_non_finite_leaf() {
        assert_eq!(
            Tree::leaf(f64::NAN).validate(0),
            Err(TreeValidationError::NonFiniteValue { node: 0 })
        );
    }
}
