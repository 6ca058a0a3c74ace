//! Pipeline persistence.
//!
//! A pipeline is written as one JSON document:
//!
//! ```json
//! {
//!   "schema_version": "v1",
//!   "model_type": "salary_pipeline",
//!   "model": { "preprocessor": { ... }, "model": { "meta": { ... }, "forest": { ... } } }
//! }
//! ```
//!
//! The version is checked before the body is decoded, so documents from a
//! newer writer fail with [`ReadError::UnsupportedVersion`] rather than a
//! field error. Everything read back is structurally validated.

mod convert;
mod error;
pub mod schema;

use std::fs;
use std::path::Path;

pub use error::{ReadError, WriteError};
use schema::{Envelope, PipelineSchema, SCHEMA_VERSION};

use crate::pipeline::SalaryPipeline;

impl SalaryPipeline {
    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, WriteError> {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION.to_string(),
            model_type: PipelineSchema::MODEL_TYPE.to_string(),
            model: PipelineSchema::from(self),
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ReadError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let version = value
            .get("schema_version")
            .and_then(serde_json::Value::as_str)
            .ok_or(ReadError::MissingVersion)?;
        if version != SCHEMA_VERSION {
            return Err(ReadError::UnsupportedVersion(version.to_string()));
        }

        let envelope: Envelope<PipelineSchema> = serde_json::from_value(value)?;
        if envelope.model_type != PipelineSchema::MODEL_TYPE {
            return Err(ReadError::UnsupportedModelType(envelope.model_type));
        }
        SalaryPipeline::try_from(envelope.model)
    }

    /// Write to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let json = self.to_json_string()?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureSchema;
    use crate::model::GBDTConfig;
    use crate::testing::synthetic_salaries;

    fn fitted() -> SalaryPipeline {
        let data = synthetic_salaries(120, 5);
        let config = GBDTConfig::builder().n_trees(15).build().unwrap();
        SalaryPipeline::fit(&FeatureSchema::salary(), &data, None, &config).unwrap()
    }

    #[test]
    fn json_roundtrip_is_exact() {
        let pipeline = fitted();
        let json = pipeline.to_json_string().unwrap();
        let back = SalaryPipeline::from_json_str(&json).unwrap();
        assert_eq!(back, pipeline);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let json = fitted().to_json_string().unwrap().replacen(r#""v1""#, r#""v9""#, 1);
        match SalaryPipeline::from_json_str(&json) {
            Err(ReadError::UnsupportedVersion(v)) => assert_eq!(v, "v9"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_version_and_bad_json() {
        assert!(matches!(SalaryPipeline::from_json_str("{}"), Err(ReadError::MissingVersion)));
        assert!(matches!(SalaryPipeline::from_json_str("not json"), Err(ReadError::Json(_))));
    }

    #[test]
    fn wrong_model_type_is_rejected() {
        let json = fitted()
            .to_json_string()
            .unwrap()
            .replacen(r#""salary_pipeline""#, r#""other""#, 1);
        assert!(matches!(
            SalaryPipeline::from_json_str(&json),
            Err(ReadError::UnsupportedModelType(t)) if t == "other"
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let pipeline = fitted();
        pipeline.save(&path).unwrap();
        assert_eq!(SalaryPipeline::load(&path).unwrap(), pipeline);
        assert!(matches!(SalaryPipeline::load(dir.path().join("missing.json")), Err(ReadError::Io(_))));
    }
}
