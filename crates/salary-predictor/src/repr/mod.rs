//! Model representations.
//!
//! - [`Tree`]: SoA decision tree with numeric splits and scalar leaves
//! - [`Forest`]: additive ensemble of trees plus a base score

mod forest;
mod tree;

pub use forest::{Forest, ForestValidationError};
pub use tree::{Tree, TreeBuilder, TreeValidationError};

/// Node index local to a tree (0 = root).
pub type NodeId = u32;
