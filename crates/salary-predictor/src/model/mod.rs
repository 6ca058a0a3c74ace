//! High-level model API.
//!
//! - [`GBDTConfig`]: validated training configuration (builder)
//! - [`GBDTModel`]: trained forest with train/predict
//! - [`ModelMeta`]: feature count, names and objective

mod config;
mod gbdt;
mod meta;

pub use config::{ConfigError, GBDTConfig, RegularizationParams};
pub use gbdt::GBDTModel;
pub use meta::ModelMeta;
