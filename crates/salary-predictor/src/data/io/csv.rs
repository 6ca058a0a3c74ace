//! CSV dataset loader.
//!
//! The header row is read to discover column names, then every column is
//! re-read as UTF-8 and parsed per schema slot. Cleaning rules:
//!
//! - `""`, `NA`, `NaN` and `nan` are missing values, ignoring surrounding
//!   whitespace
//! - categorical labels are kept verbatim, whitespace included
//! - rows with any missing feature or target are dropped
//! - rows whose numeric cells do not parse as numbers are dropped
//! - rows with `Salary <= 10000` are dropped

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::error::DatasetLoadError;
use crate::data::{FeatureSchema, FeatureValue, Row, SalaryDataset};

/// Cell values treated as missing.
pub const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Rows with a target at or below this value are dropped.
pub const MIN_SALARY: f64 = 10_000.0;

const BATCH_SIZE: usize = 8192;

/// Row counts for each cleaning rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleaningReport {
	pub total_rows: usize,
	pub dropped_missing: usize,
	pub dropped_unparseable: usize,
	pub dropped_low_target: usize,
}

impl CleaningReport {
	pub fn kept(&self) -> usize {
		self.total_rows - self.dropped_missing - self.dropped_unparseable - self.dropped_low_target
	}
}

/// A cleaned dataset together with its cleaning statistics.
#[derive(Clone, Debug)]
pub struct LoadedDataset {
	pub dataset: SalaryDataset,
	pub report: CleaningReport,
}

// =============================================================================
// Public API
// =============================================================================

/// Load and clean a salary CSV file.
///
/// Columns are matched by their CSV header (see [`FeatureSlot::column`](crate::data::FeatureSlot)).
/// Extra columns are ignored.
pub fn load_salary_csv(
	path: impl AsRef<Path>,
	schema: &FeatureSchema,
) -> Result<LoadedDataset, DatasetLoadError> {
	let path = path.as_ref();
	let batches = read_utf8_batches(path)?;

	let mut dataset = SalaryDataset::default();
	let mut report = CleaningReport::default();

	for batch in &batches {
		let columns = resolve_columns(batch, schema)?;
		let target = string_column(batch, schema.target())?;

		for row_idx in 0..batch.num_rows() {
			report.total_rows += 1;
			match parse_row(schema, &columns, target, row_idx) {
				RowOutcome::Kept(row, salary) => {
					dataset.rows.push(row);
					dataset.targets.push(salary);
				}
				RowOutcome::Missing => report.dropped_missing += 1,
				RowOutcome::Unparseable => report.dropped_unparseable += 1,
				RowOutcome::LowTarget => report.dropped_low_target += 1,
			}
		}
	}

	tracing::info!(
		path = %path.display(),
		total = report.total_rows,
		kept = report.kept(),
		dropped_missing = report.dropped_missing,
		dropped_unparseable = report.dropped_unparseable,
		dropped_low_target = report.dropped_low_target,
		"loaded salary dataset"
	);

	if dataset.is_empty() {
		return Err(DatasetLoadError::Empty {
			total: report.total_rows,
		});
	}

	Ok(LoadedDataset { dataset, report })
}

// =============================================================================
// Internal helpers
// =============================================================================

enum RowOutcome {
	Kept(Row, f64),
	Missing,
	Unparseable,
	LowTarget,
}

fn read_utf8_batches(path: &Path) -> Result<Vec<RecordBatch>, DatasetLoadError> {
	let format = Format::default().with_header(true);
	let (inferred, _) = format.infer_schema(BufReader::new(File::open(path)?), Some(100))?;

	// Read every column as text; parsing and missing-value rules are ours.
	let fields: Vec<Field> = inferred
		.fields()
		.iter()
		.map(|f| Field::new(f.name(), DataType::Utf8, true))
		.collect();
	let schema = Arc::new(Schema::new(fields));

	let reader = ReaderBuilder::new(schema)
		.with_header(true)
		.with_batch_size(BATCH_SIZE)
		.build(BufReader::new(File::open(path)?))?;

	let mut batches = Vec::new();
	for batch in reader {
		batches.push(batch?);
	}
	Ok(batches)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, DatasetLoadError> {
	let column = batch
		.column_by_name(name)
		.ok_or_else(|| DatasetLoadError::MissingColumn(name.to_string()))?;
	column
		.as_any()
		.downcast_ref::<StringArray>()
		.ok_or_else(|| DatasetLoadError::UnsupportedType {
			column: name.to_string(),
			expected: "Utf8".to_string(),
			got: format!("{:?}", column.data_type()),
		})
}

fn resolve_columns<'a>(
	batch: &'a RecordBatch,
	schema: &FeatureSchema,
) -> Result<Vec<&'a StringArray>, DatasetLoadError> {
	schema
		.slots()
		.iter()
		.map(|slot| string_column(batch, &slot.column))
		.collect()
}

fn cell(array: &StringArray, row: usize) -> Option<&str> {
	if array.is_null(row) {
		return None;
	}
	let value = array.value(row);
	if MISSING_TOKENS.contains(&value.trim()) {
		None
	} else {
		Some(value)
	}
}

fn parse_row(
	schema: &FeatureSchema,
	columns: &[&StringArray],
	target: &StringArray,
	row_idx: usize,
) -> RowOutcome {
	let Some(raw_target) = cell(target, row_idx) else {
		return RowOutcome::Missing;
	};
	let mut cells = Vec::with_capacity(columns.len());
	for column in columns {
		match cell(column, row_idx) {
			Some(value) => cells.push(value),
			None => return RowOutcome::Missing,
		}
	}

	let Ok(salary) = raw_target.trim().parse::<f64>() else {
		return RowOutcome::Unparseable;
	};
	if !salary.is_finite() {
		return RowOutcome::Unparseable;
	}

	let mut row = Vec::with_capacity(cells.len());
	for (slot, value) in schema.slots().iter().zip(cells) {
		if slot.feature_type.is_numeric() {
			match value.trim().parse::<f64>() {
				Ok(v) if v.is_finite() => row.push(FeatureValue::Numeric(v)),
				_ => return RowOutcome::Unparseable,
			}
		} else {
			row.push(FeatureValue::Categorical(value.to_string()));
		}
	}

	if salary <= MIN_SALARY {
		return RowOutcome::LowTarget;
	}
	RowOutcome::Kept(row, salary)
}
