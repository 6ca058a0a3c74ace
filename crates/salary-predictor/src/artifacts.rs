//! Read-only artifact store shared by the serving layer.
//!
//! A directory holds two files written by training:
//!
//! - `salary_pipeline.json`: the fitted [`SalaryPipeline`]
//! - `label_mappings.json`: the [`EncodingTable`], feature -> label list
//!
//! The encoding table is always derived from the pipeline's own encoders.
//! The mappings file is a published copy; when present it must agree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::data::FeatureSchema;
use crate::encoding::EncodingTable;
use crate::persist::{ReadError, WriteError};
use crate::pipeline::SalaryPipeline;

/// Pipeline file name inside an artifact directory.
pub const PIPELINE_FILE: &str = "salary_pipeline.json";
/// Encoding table file name inside an artifact directory.
pub const LABEL_MAPPINGS_FILE: &str = "label_mappings.json";

/// Errors loading or saving artifacts. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("pipeline file not found: {0}")]
    MissingPipeline(PathBuf),

    #[error("failed to read pipeline {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("failed to read label mappings {path}: {source}")]
    LabelMappings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("label mappings in {path} do not match the pipeline encoders")]
    EncodingMismatch { path: PathBuf },

    #[error("pipeline features do not match the salary schema: {0}")]
    SchemaMismatch(String),

    #[error("failed to write pipeline: {0}")]
    Write(#[from] WriteError),
}

/// Immutable handle on a loaded pipeline and its encoding table.
#[derive(Debug)]
pub struct ArtifactStore {
    pipeline: SalaryPipeline,
    encoding: EncodingTable,
}

impl ArtifactStore {
    /// Wrap an in-memory pipeline, checking it against the salary schema.
    pub fn from_pipeline(pipeline: SalaryPipeline) -> Result<Self, ArtifactError> {
        let expected = FeatureSchema::salary();
        if pipeline.schema() != &expected {
            let got: Vec<String> = pipeline
                .schema()
                .slots()
                .iter()
                .map(|s| format!("{}:{}", s.name, s.feature_type.as_str()))
                .collect();
            return Err(ArtifactError::SchemaMismatch(format!(
                "got slots [{}] (target {})",
                got.join(", "),
                pipeline.schema().target()
            )));
        }
        let encoding = pipeline
            .encoding_table()
            .map_err(|e| ArtifactError::SchemaMismatch(e.to_string()))?;
        Ok(Self { pipeline, encoding })
    }

    /// Load `dir/salary_pipeline.json` and, if present, check
    /// `dir/label_mappings.json` against it.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let pipeline_path = dir.join(PIPELINE_FILE);
        if !pipeline_path.is_file() {
            return Err(ArtifactError::MissingPipeline(pipeline_path));
        }

        let pipeline = SalaryPipeline::load(&pipeline_path).map_err(|source| ArtifactError::Read {
            path: pipeline_path.clone(),
            source,
        })?;
        let store = Self::from_pipeline(pipeline)?;

        let mappings_path = dir.join(LABEL_MAPPINGS_FILE);
        if mappings_path.is_file() {
            let json = fs::read_to_string(&mappings_path).map_err(|source| ArtifactError::Io {
                path: mappings_path.clone(),
                source,
            })?;
            let published: EncodingTable =
                serde_json::from_str(&json).map_err(|source| ArtifactError::LabelMappings {
                    path: mappings_path.clone(),
                    source,
                })?;
            if published != store.encoding {
                return Err(ArtifactError::EncodingMismatch { path: mappings_path });
            }
        } else {
            tracing::warn!(path = %mappings_path.display(), "label mappings not found, using pipeline encoders");
        }

        tracing::info!(
            dir = %dir.display(),
            n_trees = store.pipeline.model().n_trees(),
            n_features = store.pipeline.model().n_features(),
            "loaded artifacts"
        );
        Ok(store)
    }

    /// Write both artifact files into `dir`, creating it if needed.
    ///
    /// Returns the paths written, pipeline first.
    pub fn save(dir: impl AsRef<Path>, pipeline: &SalaryPipeline) -> Result<(PathBuf, PathBuf), ArtifactError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let pipeline_path = dir.join(PIPELINE_FILE);
        pipeline.save(&pipeline_path)?;

        let encoding = pipeline
            .encoding_table()
            .map_err(|e| ArtifactError::SchemaMismatch(e.to_string()))?;
        let mappings_path = dir.join(LABEL_MAPPINGS_FILE);
        let json = serde_json::to_string_pretty(&encoding).map_err(WriteError::from)?;
        fs::write(&mappings_path, json).map_err(|source| ArtifactError::Io {
            path: mappings_path.clone(),
            source,
        })?;

        tracing::info!(pipeline = %pipeline_path.display(), mappings = %mappings_path.display(), "saved artifacts");
        Ok((pipeline_path, mappings_path))
    }

    pub fn pipeline(&self) -> &SalaryPipeline {
        &self.pipeline
    }

    pub fn encoding(&self) -> &EncodingTable {
        &self.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureSlot, FeatureValue, SalaryDataset};
    use crate::model::GBDTConfig;
    use crate::testing::synthetic_salaries;

    fn fitted() -> SalaryPipeline {
        let data = synthetic_salaries(80, 11);
        let config = GBDTConfig::builder().n_trees(10).build().unwrap();
        SalaryPipeline::fit(&FeatureSchema::salary(), &data, None, &config).unwrap()
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = fitted();
        let (p, m) = ArtifactStore::save(dir.path().join("out"), &pipeline).unwrap();
        assert!(p.ends_with(PIPELINE_FILE));
        assert!(m.ends_with(LABEL_MAPPINGS_FILE));

        let store = ArtifactStore::load(dir.path().join("out")).unwrap();
        assert_eq!(store.pipeline(), &pipeline);
        assert_eq!(store.encoding(), &pipeline.encoding_table().unwrap());
    }

    #[test]
    fn missing_pipeline_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ArtifactStore::load(dir.path()),
            Err(ArtifactError::MissingPipeline(_))
        ));
    }

    #[test]
    fn mismatched_mappings_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::save(dir.path(), &fitted()).unwrap();
        fs::write(dir.path().join(LABEL_MAPPINGS_FILE), r#"{"Gender":["Female","Male"]}"#).unwrap();
        assert!(matches!(
            ArtifactStore::load(dir.path()),
            Err(ArtifactError::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn mappings_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::save(dir.path(), &fitted()).unwrap();
        fs::remove_file(dir.path().join(LABEL_MAPPINGS_FILE)).unwrap();
        assert!(ArtifactStore::load(dir.path()).is_ok());
    }

    fn salary_slots() -> Vec<FeatureSlot> {
        FeatureSchema::salary().slots().to_vec()
    }

    fn fitted_with(schema: &FeatureSchema, data: &SalaryDataset) -> SalaryPipeline {
        let config = GBDTConfig::builder().n_trees(5).build().unwrap();
        SalaryPipeline::fit(schema, data, None, &config).unwrap()
    }

    #[test]
    fn schema_mismatch_is_fatal() {
        let mut slots = salary_slots();
        slots[4] = FeatureSlot::numeric("Experience", "Years of Experience");
        let schema = FeatureSchema::new(slots, "Salary");
        let pipeline = fitted_with(&schema, &synthetic_salaries(60, 5));

        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::save(dir.path(), &pipeline).unwrap();
        let err = ArtifactStore::load(dir.path()).unwrap_err();
        assert!(
            matches!(err, ArtifactError::SchemaMismatch(ref msg) if msg.contains("Experience:numeric")),
            "{err}"
        );
    }

    #[test]
    fn slot_type_swap_is_fatal() {
        let mut slots = salary_slots();
        slots[0] = FeatureSlot::categorical("Age", "Age");
        let schema = FeatureSchema::new(slots, "Salary");

        let mut data = synthetic_salaries(60, 6);
        for row in &mut data.rows {
            if let FeatureValue::Numeric(age) = row[0] {
                row[0] = FeatureValue::Categorical(format!("{}", age.round() as i64));
            }
        }
        let pipeline = fitted_with(&schema, &data);

        assert!(matches!(
            ArtifactStore::from_pipeline(pipeline.clone()),
            Err(ArtifactError::SchemaMismatch(ref msg)) if msg.contains("Age:categorical")
        ));

        let dir = tempfile::tempdir().unwrap();
        ArtifactStore::save(dir.path(), &pipeline).unwrap();
        assert!(matches!(
            ArtifactStore::load(dir.path()),
            Err(ArtifactError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn corrupt_pipeline_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PIPELINE_FILE), "{\"schema_version\":").unwrap();
        assert!(matches!(ArtifactStore::load(dir.path()), Err(ArtifactError::Read { .. })));
    }
}
