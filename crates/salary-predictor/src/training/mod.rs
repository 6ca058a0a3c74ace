//! Training infrastructure.
//!
//! - [`ObjectiveFn`] / [`Objective`]: losses that supply gradients
//! - [`MetricFn`] / [`Metric`]: evaluation during training
//! - [`EarlyStopping`]: stops when the watched metric plateaus
//! - [`TrainingLogger`] / [`Verbosity`]: progress through `tracing`
//! - [`gbdt`]: histogram-based tree training

mod callback;
pub mod gbdt;
mod gradients;
mod logger;
mod metrics;
mod objectives;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use gbdt::{EvalSet, GBDTParams, GBDTTrainer, GainParams, TrainError};
pub use gradients::Gradients;
pub use logger::{MetricValue, TrainingLogger, Verbosity};
pub use metrics::{Mae, Metric, MetricFn, Rmse, R2};
pub use objectives::{AbsoluteLoss, Objective, ObjectiveFn, SquaredLoss};
