//! Binary model artifacts
//!
//! An artifact is a bincode-encoded envelope holding metadata and the
//! bincode-encoded `ModelAdapter`. The model bytes are protected by a
//! SHA-256 checksum that `load` verifies.

use crate::error::{EvalError, Result};
use crate::training::{Classifier, ModelAdapter, ModelKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

const MAGIC: [u8; 4] = *b"MEVL";
const FORMAT_VERSION: u32 = 1;

/// Descriptive fields stored next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub name: String,
    pub model_kind: ModelKind,
    /// Task identifier, e.g. "magnetism"
    pub task: Option<String>,
    /// Feature columns in the order the model was fitted on
    pub feature_names: Vec<String>,
    /// Class names indexed by label value
    pub class_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub hyperparameters: BTreeMap<String, String>,
    pub n_training_samples: Option<usize>,
}

impl ArtifactMetadata {
    pub fn new(name: impl Into<String>, model_kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            model_kind,
            task: None,
            feature_names: Vec::new(),
            class_names: Vec::new(),
            created_at: Utc::now(),
            hyperparameters: BTreeMap::new(),
            n_training_samples: None,
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_names = features;
        self
    }

    pub fn with_class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = names;
        self
    }

    pub fn with_training_samples(mut self, n: usize) -> Self {
        self.n_training_samples = Some(n);
        self
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    metadata: ArtifactMetadata,
    model_data: Vec<u8>,
    checksum: [u8; 32],
}

fn checksum(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A classifier together with its metadata, as stored on disk
#[derive(Debug)]
pub struct ModelArtifact {
    pub metadata: ArtifactMetadata,
    pub model: ModelAdapter,
}

impl ModelArtifact {
    /// Wrap a model; hyperparameters are copied into the metadata
    pub fn new(mut metadata: ArtifactMetadata, model: ModelAdapter) -> Self {
        metadata.model_kind = model.kind();
        metadata.hyperparameters = model
            .params()
            .describe(model.kind())
            .into_iter()
            .collect();
        Self { metadata, model }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let model_data = bincode::serialize(&self.model)?;
        let envelope = Envelope {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            metadata: self.metadata.clone(),
            checksum: checksum(&model_data),
            model_data,
        };
        Ok(bincode::serialize(&envelope)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Envelope = bincode::deserialize(bytes)?;

        if envelope.magic != MAGIC {
            return Err(EvalError::SerializationError(
                "Not a model artifact (bad magic bytes)".to_string(),
            ));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(EvalError::SerializationError(format!(
                "Unsupported artifact format version {} (expected {})",
                envelope.format_version, FORMAT_VERSION
            )));
        }
        if checksum(&envelope.model_data) != envelope.checksum {
            return Err(EvalError::SerializationError(
                "Model checksum mismatch".to_string(),
            ));
        }

        let model: ModelAdapter = bincode::deserialize(&envelope.model_data)?;
        Ok(Self {
            metadata: envelope.metadata,
            model,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut writer = BufWriter::new(File::create(path)?);
        std::io::Write::write_all(&mut writer, &bytes)?;
        info!(
            path = %path.display(),
            model = %self.metadata.model_kind,
            bytes = bytes.len(),
            "Saved model artifact"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        let mut reader = BufReader::new(File::open(path).map_err(|e| {
            EvalError::DataError(format!("{}: {}", path.display(), e))
        })?);
        std::io::Read::read_to_end(&mut reader, &mut bytes)?;

        let artifact = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            model = %artifact.metadata.model_kind,
            fitted = artifact.model.is_fitted(),
            "Loaded model artifact"
        );
        Ok(artifact)
    }

    /// Check that the data columns match the recorded feature names.
    ///
    /// Artifacts without recorded names accept any columns.
    pub fn check_features(&self, columns: &[String]) -> Result<()> {
        let expected = &self.metadata.feature_names;
        if expected.is_empty() {
            return Ok(());
        }
        let missing: Vec<&String> = expected.iter().filter(|c| !columns.contains(c)).collect();
        if !missing.is_empty() {
            return Err(EvalError::ValidationError(format!(
                "Data is missing feature columns required by the model: {:?}",
                missing
            )));
        }
        Ok(())
    }
}
