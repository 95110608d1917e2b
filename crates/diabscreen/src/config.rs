use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StartupError;

/// File describing a model artifact directory.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Optional sibling file holding the ordered training column names.
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";

/// Supported predictor backends.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Gradient boosted trees in the `gbdt` crate's JSON format.
    Gbdt,
    /// Intercept plus named coefficients.
    Logistic,
    /// xgboost trees converted to the dump format `gbdt` reads.
    Xgboost,
}

impl ModelBackend {
    pub fn default_model_file(self) -> &'static str {
        match self {
            ModelBackend::Gbdt => "gbdt.model",
            ModelBackend::Logistic => "logistic.json",
            ModelBackend::Xgboost => "xgboost.model",
        }
    }
}

impl Default for ModelBackend {
    fn default() -> Self {
        ModelBackend::Gbdt
    }
}

impl FromStr for ModelBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelBackend::Gbdt),
            "logistic" => Ok(ModelBackend::Logistic),
            "xgboost" => Ok(ModelBackend::Xgboost),
            _ => Err(format!(
                "Unknown model backend: {}. Expected 'gbdt', 'logistic' or 'xgboost'",
                s
            )),
        }
    }
}

/// Contents of `manifest.json` inside a model directory.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelManifest {
    #[serde(default = "default_model_name")]
    pub name: String,

    pub backend: String,

    /// Model file relative to the artifact directory. Defaults per backend.
    #[serde(default)]
    pub model_file: Option<String>,

    /// Schema version the model was trained against.
    #[serde(default)]
    pub schema_version: Option<String>,

    /// Ordered training column names.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

fn default_model_name() -> String {
    "classifier".to_string()
}

impl ModelManifest {
    pub fn new(backend: ModelBackend) -> Self {
        Self {
            name: default_model_name(),
            backend: match backend {
                ModelBackend::Gbdt => "gbdt".to_string(),
                ModelBackend::Logistic => "logistic".to_string(),
                ModelBackend::Xgboost => "xgboost".to_string(),
            },
            model_file: None,
            schema_version: None,
            feature_names: None,
        }
    }

    pub fn backend(&self) -> Result<ModelBackend, StartupError> {
        self.backend
            .parse()
            .map_err(|_| StartupError::UnknownBackend(self.backend.clone()))
    }

    /// Read `manifest.json` from an artifact directory. When the manifest has
    /// no `feature_names`, `feature_names.json` next to it is used if present.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, StartupError> {
        let dir = dir.as_ref();
        let path = dir.join(MANIFEST_FILE);
        let mut manifest: ModelManifest = read_json(&path)?;

        if manifest.feature_names.is_none() {
            let names_path = dir.join(FEATURE_NAMES_FILE);
            if names_path.is_file() {
                manifest.feature_names = Some(read_json(&names_path)?);
            }
        }
        Ok(manifest)
    }

    pub fn model_path(&self, dir: &Path) -> Result<PathBuf, StartupError> {
        let file = match &self.model_file {
            Some(f) => f.clone(),
            None => self.backend()?.default_model_file().to_string(),
        };
        Ok(dir.join(file))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StartupError> {
    let content = fs::read_to_string(path).map_err(|e| StartupError::ArtifactUnreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| StartupError::ArtifactCorrupt {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
