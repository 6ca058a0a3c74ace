//! Prediction contract scenarios against a trained in-memory store.

use std::sync::{Arc, OnceLock};

use rstest::rstest;
use serde_json::{json, Value};

use salary_predictor::testing::{sample_requests, synthetic_salaries};
use salary_predictor::utils::round_cents;
use salary_predictor::{
    ArtifactStore, FeatureSchema, GBDTConfig, PredictionError, PredictionService, SalaryPipeline,
};

fn store() -> Arc<ArtifactStore> {
    static STORE: OnceLock<Arc<ArtifactStore>> = OnceLock::new();
    STORE
        .get_or_init(|| {
            let data = synthetic_salaries(400, 42);
            let config = GBDTConfig::builder().n_trees(80).build().unwrap();
            let pipeline = SalaryPipeline::fit(&FeatureSchema::salary(), &data, None, &config).unwrap();
            Arc::new(ArtifactStore::from_pipeline(pipeline).unwrap())
        })
        .clone()
}

fn service() -> PredictionService {
    PredictionService::new(store())
}

fn base_request() -> Value {
    sample_requests().remove(0)
}

#[test]
fn sample_requests_succeed_with_two_decimals() {
    let svc = service();
    for request in sample_requests() {
        let salary = svc.predict(Some(&request)).unwrap().predicted_salary;
        assert!(salary.is_finite());
        assert_eq!(round_cents(salary), salary);
        assert!(salary > 10_000.0, "{salary}");
    }
}

#[test]
fn service_matches_pipeline_prediction() {
    let svc = service();
    let request = base_request();
    let row = svc.validate(Some(&request)).unwrap();
    let raw = store().pipeline().predict_row(&row).unwrap();
    assert_eq!(svc.predict(Some(&request)).unwrap().predicted_salary, round_cents(raw));
}

#[test]
fn senior_roles_earn_more() {
    let svc = service();
    let requests = sample_requests();
    let engineer = svc.predict(Some(&requests[0])).unwrap().predicted_salary;
    let manager = svc.predict(Some(&requests[2])).unwrap().predicted_salary;
    assert!(manager > engineer);
}

#[rstest]
#[case("Age")]
#[case("Gender")]
#[case("Education_Level")]
#[case("Job_Title")]
#[case("Years_of_Experience")]
fn any_missing_field_is_rejected(#[case] field: &str) {
    let mut request = base_request();
    request.as_object_mut().unwrap().remove(field);

    let err = service().predict(Some(&request)).unwrap_err();
    assert_eq!(err, PredictionError::MissingField(vec![field.to_string()]));
    assert_eq!(err.status().as_u16(), 400);
}

#[rstest]
#[case("Gender", "Unknown")]
#[case("Education_Level", "Kindergarten")]
#[case("Job_Title", "Astronaut")]
fn unknown_categories_are_client_errors(#[case] field: &str, #[case] value: &str) {
    let mut request = base_request();
    request[field] = json!(value);

    let err = service().predict(Some(&request)).unwrap_err();
    assert_eq!(err.status().as_u16(), 400);
    assert!(err.to_string().contains(value));
    assert!(err.to_string().contains(field));
}

#[test]
fn empty_payload_message() {
    let err = service().predict(Some(&json!({}))).unwrap_err();
    assert_eq!(err.to_string(), "No input data provided");
}

#[test]
fn categories_are_stable_across_calls() {
    let svc = service();
    let first = serde_json::to_value(svc.list_categories()).unwrap();
    let second = serde_json::to_value(svc.list_categories()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first["Gender"], json!(["Male", "Female"]));
    assert_eq!(
        first["Job_Title"],
        json!(["Software Engineer", "Data Analyst", "Senior Manager", "Sales Associate", "Director"])
    );
}
