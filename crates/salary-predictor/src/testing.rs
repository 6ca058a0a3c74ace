//! Deterministic synthetic data for tests, benches and the CLI demo.

use rand::prelude::*;
use serde_json::{json, Value};

use crate::data::{FeatureValue, Row, SalaryDataset};

/// Genders seen in the synthetic data.
pub const GENDERS: &[&str] = &["Male", "Female"];

/// Education levels with their salary premium.
pub const EDUCATION_LEVELS: &[(&str, f64)] = &[
	("Bachelor's", 0.0),
	("Master's", 12_000.0),
	("PhD", 25_000.0),
];

/// Job titles with their base salary.
pub const JOB_TITLES: &[(&str, f64)] = &[
	("Software Engineer", 70_000.0),
	("Data Analyst", 55_000.0),
	("Senior Manager", 110_000.0),
	("Sales Associate", 40_000.0),
	("Director", 140_000.0),
];

/// Generate `n` labeled rows in salary schema order.
///
/// Salary grows with experience, education and title, plus uniform noise.
/// Every value stays well above the cleaning floor.
pub fn synthetic_salaries(n: usize, seed: u64) -> SalaryDataset {
	let mut rng = StdRng::seed_from_u64(seed);
	let mut rows = Vec::with_capacity(n);
	let mut targets = Vec::with_capacity(n);

	for i in 0..n {
		// Cycle the first rows through every label so small samples see them all.
		let gender = GENDERS[if i < GENDERS.len() { i } else { rng.random_range(0..GENDERS.len()) }];
		let (education, premium) =
			EDUCATION_LEVELS[if i < EDUCATION_LEVELS.len() { i } else { rng.random_range(0..EDUCATION_LEVELS.len()) }];
		let (title, base) = JOB_TITLES[if i < JOB_TITLES.len() { i } else { rng.random_range(0..JOB_TITLES.len()) }];

		let experience = rng.random_range(0..25) as f64;
		let age = 22.0 + experience + rng.random_range(0..8) as f64;
		let noise = rng.random_range(-3_000.0..3_000.0);
		let salary = base + premium + 2_500.0 * experience + noise;

		rows.push(vec![
			FeatureValue::Numeric(age),
			FeatureValue::from(gender),
			FeatureValue::from(education),
			FeatureValue::from(title),
			FeatureValue::Numeric(experience),
		]);
		targets.push(salary);
	}

	SalaryDataset::new(rows, targets)
}

/// One raw row from positional values.
pub fn row(age: f64, gender: &str, education: &str, title: &str, experience: f64) -> Row {
	vec![
		FeatureValue::Numeric(age),
		FeatureValue::from(gender),
		FeatureValue::from(education),
		FeatureValue::from(title),
		FeatureValue::Numeric(experience),
	]
}

/// Example `/predict` request bodies.
pub fn sample_requests() -> Vec<Value> {
	vec![
		json!({
			"Age": 32,
			"Gender": "Male",
			"Education_Level": "Bachelor's",
			"Job_Title": "Software Engineer",
			"Years_of_Experience": 5
		}),
		json!({
			"Age": 28,
			"Gender": "Female",
			"Education_Level": "Master's",
			"Job_Title": "Data Analyst",
			"Years_of_Experience": 3
		}),
		json!({
			"Age": 45,
			"Gender": "Male",
			"Education_Level": "PhD",
			"Job_Title": "Senior Manager",
			"Years_of_Experience": 15
		}),
		json!({
			"Age": 36,
			"Gender": "Female",
			"Education_Level": "Bachelor's",
			"Job_Title": "Sales Associate",
			"Years_of_Experience": 7
		}),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deterministic_per_seed() {
		let a = synthetic_salaries(40, 9);
		let b = synthetic_salaries(40, 9);
		assert_eq!(a.rows, b.rows);
		assert_eq!(a.targets, b.targets);
		assert_ne!(synthetic_salaries(40, 10).targets, a.targets);
	}

	#[test]
	fn covers_all_labels_and_stays_above_floor() {
		let data = synthetic_salaries(5, 0);
		let titles: Vec<&str> = data.rows.iter().filter_map(|r| r[3].as_label()).collect();
		assert_eq!(titles, JOB_TITLES.iter().map(|(t, _)| *t).collect::<Vec<_>>());
		assert!(data.targets.iter().all(|&s| s > 10_000.0));
	}
}
