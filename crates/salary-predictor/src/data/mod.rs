//! Data handling: feature schema, raw rows, CSV loading and splitting.

pub mod io;
mod record;
mod schema;
mod split;

pub use record::{FeatureValue, Row, SalaryDataset};
pub use schema::{FeatureSchema, FeatureSlot, FeatureType};
pub use split::{train_test_split, train_valid_test_split, DEFAULT_TEST_FRACTION};
