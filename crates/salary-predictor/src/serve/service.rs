//! Stateless prediction handler over a shared [`ArtifactStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::PredictionError;
use crate::artifacts::ArtifactStore;
use crate::data::{FeatureType, FeatureValue, Row};
use crate::encoding::EncodingTable;
use crate::utils::round_cents;

/// Successful prediction body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Salary rounded to two decimals.
    pub predicted_salary: f64,
}

/// Validates requests and runs them through the loaded pipeline.
///
/// Cheap to clone; all clones share one store.
#[derive(Debug, Clone)]
pub struct PredictionService {
    store: Arc<ArtifactStore>,
}

impl PredictionService {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Validate, encode and predict one request.
    pub fn predict(&self, payload: Option<&Value>) -> Result<PredictionResponse, PredictionError> {
        let row = self.validate(payload)?;
        self.predict_row(&row)
    }

    /// Turn a raw JSON request into a row in schema order.
    ///
    /// Checks run in order: payload presence, required fields, then each
    /// slot's type and category. The first failing slot is reported.
    pub fn validate(&self, payload: Option<&Value>) -> Result<Row, PredictionError> {
        let fields = match payload {
            Some(Value::Object(map)) if !map.is_empty() => map,
            _ => return Err(PredictionError::EmptyPayload),
        };

        let schema = self.store.pipeline().schema();
        let missing: Vec<String> = schema
            .slots()
            .iter()
            .filter(|slot| !fields.contains_key(&slot.name))
            .map(|slot| slot.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(PredictionError::MissingField(missing));
        }

        schema
            .slots()
            .iter()
            .map(|slot| match slot.feature_type {
                FeatureType::Numeric => numeric_field(fields, &slot.name),
                FeatureType::Categorical => self.categorical_field(fields, &slot.name),
            })
            .collect()
    }

    /// Run one validated row through the pipeline and round the result.
    pub fn predict_row(&self, row: &Row) -> Result<PredictionResponse, PredictionError> {
        let value = self
            .store
            .pipeline()
            .predict_row(row)
            .map_err(|e| PredictionError::PredictionFailure(e.to_string()))?;
        Ok(PredictionResponse {
            predicted_salary: round_cents(value),
        })
    }

    /// Every categorical feature with its known labels, as persisted.
    pub fn list_categories(&self) -> &EncodingTable {
        self.store.encoding()
    }

    fn categorical_field(&self, fields: &Map<String, Value>, name: &str) -> Result<FeatureValue, PredictionError> {
        let label = match fields.get(name) {
            Some(Value::String(s)) => s,
            _ => {
                return Err(PredictionError::InvalidField {
                    field: name.to_string(),
                    reason: "expected a string",
                })
            }
        };
        if self.store.encoding().code(name, label).is_none() {
            return Err(PredictionError::UnknownCategory {
                field: name.to_string(),
                value: label.clone(),
            });
        }
        Ok(FeatureValue::Categorical(label.clone()))
    }
}

fn numeric_field(fields: &Map<String, Value>, name: &str) -> Result<FeatureValue, PredictionError> {
    fields
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map(FeatureValue::Numeric)
        .ok_or_else(|| PredictionError::InvalidField {
            field: name.to_string(),
            reason: "expected a number",
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::FeatureSchema;
    use crate::model::GBDTConfig;
    use crate::pipeline::SalaryPipeline;
    use crate::testing::{sample_requests, synthetic_salaries};

    fn service() -> PredictionService {
        let data = synthetic_salaries(150, 2);
        let config = GBDTConfig::builder().n_trees(20).build().unwrap();
        let pipeline = SalaryPipeline::fit(&FeatureSchema::salary(), &data, None, &config).unwrap();
        PredictionService::new(Arc::new(ArtifactStore::from_pipeline(pipeline).unwrap()))
    }

    #[test]
    fn valid_requests_are_rounded() {
        let svc = service();
        for request in sample_requests() {
            let response = svc.predict(Some(&request)).unwrap();
            let v = response.predicted_salary;
            assert!(v.is_finite());
            assert_eq!(round_cents(v), v);
        }
    }

    #[test]
    fn empty_payloads() {
        let svc = service();
        assert_eq!(svc.predict(None), Err(PredictionError::EmptyPayload));
        assert_eq!(svc.predict(Some(&json!({}))), Err(PredictionError::EmptyPayload));
        assert_eq!(svc.predict(Some(&json!([1, 2]))), Err(PredictionError::EmptyPayload));
        assert_eq!(svc.predict(Some(&json!("Age"))), Err(PredictionError::EmptyPayload));
    }

    #[test]
    fn missing_fields_are_listed_in_schema_order() {
        let svc = service();
        let request = json!({"Gender": "Male", "Education_Level": "PhD", "Years_of_Experience": 3});
        assert_eq!(
            svc.predict(Some(&request)),
            Err(PredictionError::MissingField(vec!["Age".into(), "Job_Title".into()]))
        );
    }

    #[test]
    fn unknown_category_names_the_value() {
        let svc = service();
        let mut request = sample_requests().remove(0);
        request["Gender"] = json!("Unknown");
        let err = svc.predict(Some(&request)).unwrap_err();
        assert_eq!(
            err,
            PredictionError::UnknownCategory {
                field: "Gender".into(),
                value: "Unknown".into()
            }
        );
        assert!(err.to_string().contains("Unknown"));

        // Matching is case-sensitive.
        request["Gender"] = json!("male");
        assert!(matches!(svc.predict(Some(&request)), Err(PredictionError::UnknownCategory { .. })));
    }

    #[test]
    fn wrong_types_are_invalid_fields() {
        let svc = service();
        let mut request = sample_requests().remove(0);
        request["Age"] = json!("thirty");
        assert!(matches!(
            svc.predict(Some(&request)),
            Err(PredictionError::InvalidField { field, .. }) if field == "Age"
        ));

        let mut request = sample_requests().remove(0);
        request["Job_Title"] = json!(null);
        assert!(matches!(
            svc.predict(Some(&request)),
            Err(PredictionError::InvalidField { field, .. }) if field == "Job_Title"
        ));
    }

    #[test]
    fn negative_numbers_are_forwarded() {
        let svc = service();
        let mut request = sample_requests().remove(0);
        request["Age"] = json!(-5);
        request["Years_of_Experience"] = json!(-1.5);
        assert!(svc.predict(Some(&request)).is_ok());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let svc = service();
        let mut request = sample_requests().remove(0);
        let baseline = svc.predict(Some(&request)).unwrap();
        request["Nickname"] = json!("x");
        assert_eq!(svc.predict(Some(&request)).unwrap(), baseline);
    }

    #[test]
    fn categories_are_the_training_vocabulary() {
        let svc = service();
        let table = svc.list_categories();
        let features: Vec<&str> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(features, ["Gender", "Education_Level", "Job_Title"]);
        assert_eq!(table.labels("Gender").unwrap(), ["Male", "Female"]);
    }
}
