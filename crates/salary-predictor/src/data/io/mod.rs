//! Dataset I/O.
//!
//! Loads the tabular salary survey into [`SalaryDataset`](crate::data::SalaryDataset)
//! rows, applying the cleaning rules used for training.

mod csv;
mod error;

pub use csv::{load_salary_csv, CleaningReport, LoadedDataset, MIN_SALARY, MISSING_TOKENS};
pub use error::DatasetLoadError;
