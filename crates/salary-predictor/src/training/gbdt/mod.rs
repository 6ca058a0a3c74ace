//! Histogram-based GBDT training.
//!
//! - [`binning`]: feature quantization
//! - [`histogram`]: per-node gradient histograms
//! - [`split`]: gain formula and greedy split search
//! - [`partition`]: row-to-leaf bookkeeping
//! - [`grower`]: depth-wise tree growth with the subtraction trick
//! - [`trainer`]: the boosting loop

pub mod binning;
pub mod grower;
pub mod histogram;
pub mod partition;
pub mod split;
pub mod trainer;

pub use binning::{BinMapper, BinnedMatrix};
pub use grower::{GrowerParams, TreeGrower};
pub use split::{GainParams, SplitInfo};
pub use trainer::{EvalSet, GBDTParams, GBDTTrainer, TrainError};
