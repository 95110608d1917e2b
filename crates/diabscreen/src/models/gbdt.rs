use std::fs;
use std::io::Cursor;
use std::path::Path;

use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use log::debug;
use serde_json::Value;

use crate::error::{PredictionError, StartupError};
use crate::features::FeatureVector;
use crate::models::classifier_trait::RiskPredictor;
use crate::schema::FeatureSchema;

/// Objective for converted xgboost dumps; yields probabilities.
pub const XGBOOST_OBJECTIVE: &str = "binary:logistic";

/// Gradient Boosting Decision Tree (GBDT) classifier loaded from the `gbdt`
/// crate's JSON model format or from a converted xgboost dump.
///
/// The model must have been trained with a probabilistic loss
/// (`LogLikelyhood` or `BinaryLogistic`) so that `predict` yields
/// probabilities rather than margins.
pub struct GbdtPredictor {
    model: GBDT,
    n_features: usize,
    feature_names: Option<Vec<String>>,
    name: String,
}

impl GbdtPredictor {
    pub fn new(model: GBDT, n_features: usize, name: impl Into<String>) -> Self {
        GbdtPredictor {
            model,
            n_features,
            feature_names: None,
            name: name.into(),
        }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Load a model written by `GBDT::save_model`.
    ///
    /// The width is the `conf.feature_size` the model was trained with, so a
    /// model of another width fails the schema check instead of panicking on
    /// the first prediction.
    pub fn load<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let corrupt = |reason: String| StartupError::ArtifactCorrupt {
            path: display.clone(),
            reason,
        };

        let content = read_artifact(path)?;
        let raw: Value = serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        let n_features = raw["conf"]["feature_size"]
            .as_u64()
            .ok_or_else(|| corrupt("missing conf.feature_size".to_string()))?
            as usize;
        if let Some(column) = max_split_column(&raw) {
            if column >= n_features {
                return Err(corrupt(format!(
                    "a tree splits on column {} of a {}-column model",
                    column, n_features
                )));
            }
        }

        let model: GBDT = serde_json::from_value(raw).map_err(|e| corrupt(e.to_string()))?;
        debug!("Loaded GBDT model from {} ({} features)", display, n_features);

        Ok(Self::new(model, n_features, name))
    }

    /// Load an xgboost model converted to the dump format `gbdt` reads
    /// (base score line, then a JSON array of trees).
    ///
    /// The dump does not record its width. Every split column must exist in
    /// `schema`; the predictor then takes the schema's width.
    pub fn load_xgboost<P: AsRef<Path>>(
        path: P,
        schema: &FeatureSchema,
        name: impl Into<String>,
    ) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = read_artifact(path)?;

        let corrupt = |reason: String| StartupError::ArtifactCorrupt {
            path: display.clone(),
            reason,
        };

        let model = GBDT::from_xgboost_reader(Cursor::new(content), XGBOOST_OBJECTIVE)
            .map_err(|e| corrupt(e.to_string()))?;
        let raw = serde_json::to_value(&model).map_err(|e| corrupt(e.to_string()))?;
        if let Some(column) = max_split_column(&raw) {
            if column >= schema.len() {
                return Err(StartupError::SchemaMismatch {
                    expected_version: schema.version.clone(),
                    detail: format!(
                        "xgboost model splits on column {}, schema has {}",
                        column,
                        schema.len()
                    ),
                });
            }
        }
        debug!("Loaded xgboost dump from {}", display);

        Ok(Self::new(model, schema.len(), name))
    }
}

fn read_artifact(path: &Path) -> Result<String, StartupError> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(StartupError::ArtifactUnreadable {
            path: display,
            reason: "file not found".to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| StartupError::ArtifactUnreadable {
        path: display,
        reason: e.to_string(),
    })
}

/// Highest column index read by any split node of a serialized `GBDT`.
fn max_split_column(model: &Value) -> Option<usize> {
    model["trees"]
        .as_array()?
        .iter()
        .filter_map(|tree| tree["tree"]["tree"].as_array())
        .flatten()
        .map(|node| &node["value"])
        .filter(|value| value["is_leaf"].as_bool() == Some(false))
        .filter_map(|value| value["feature_index"].as_u64())
        .map(|column| column as usize)
        .max()
}

impl RiskPredictor for GbdtPredictor {
    fn predict_proba(&self, row: &FeatureVector) -> Result<f32, PredictionError> {
        if row.len() != self.n_features {
            return Err(PredictionError::Arity {
                expected: self.n_features,
                got: row.len(),
            });
        }

        let mut test_x = DataVec::new();
        test_x.push(Data::new_training_data(row.to_vec(), 1.0, 0.0, None));

        let predictions = self.model.predict(&test_x);
        predictions.first().copied().ok_or(PredictionError::EmptyOutput)
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        &self.name
    }
}
