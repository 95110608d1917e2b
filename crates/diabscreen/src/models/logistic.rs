use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, StartupError};
use crate::features::FeatureVector;
use crate::models::classifier_trait::RiskPredictor;

/// One named coefficient. Kept as a list so column order survives JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub feature: String,
    pub weight: f32,
}

/// On-disk form of a logistic-regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f32,
    pub coefficients: Vec<Coefficient>,
}

/// Logistic regression: `p = 1 / (1 + exp(-(b + w·x)))`.
pub struct LogisticPredictor {
    intercept: f32,
    weights: Vec<f32>,
    feature_names: Vec<String>,
    name: String,
}

impl LogisticPredictor {
    pub fn new(model: LogisticModel, name: impl Into<String>) -> Self {
        let (feature_names, weights) = model
            .coefficients
            .into_iter()
            .map(|c| (c.feature, c.weight))
            .unzip();
        LogisticPredictor {
            intercept: model.intercept,
            weights,
            feature_names,
            name: name.into(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, name: impl Into<String>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StartupError::ArtifactUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model: LogisticModel =
            serde_json::from_str(&content).map_err(|e| StartupError::ArtifactCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if model.coefficients.is_empty() {
            return Err(StartupError::ArtifactCorrupt {
                path: path.display().to_string(),
                reason: "model has no coefficients".to_string(),
            });
        }
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.weight.is_finite()) {
            return Err(StartupError::ArtifactCorrupt {
                path: path.display().to_string(),
                reason: "model contains non-finite parameters".to_string(),
            });
        }
        Ok(Self::new(model, name))
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskPredictor for LogisticPredictor {
    fn predict_proba(&self, row: &FeatureVector) -> Result<f32, PredictionError> {
        if row.len() != self.weights.len() {
            return Err(PredictionError::Arity {
                expected: self.weights.len(),
                got: row.len(),
            });
        }
        let z = row
            .as_slice()
            .iter()
            .zip(self.weights.iter())
            .map(|(x, w)| x * w)
            .sum::<f32>()
            + self.intercept;
        Ok(sigmoid(z))
    }

    fn feature_names(&self) -> Option<&[String]> {
        Some(&self.feature_names)
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::{FEATURE_COUNT, FEATURE_NAMES};

    /// Model that only looks at BMI: p = sigmoid(0.1 * (BMI - 25)).
    pub(crate) fn bmi_only_model() -> LogisticModel {
        LogisticModel {
            intercept: -2.5,
            coefficients: FEATURE_NAMES
                .iter()
                .map(|name| Coefficient {
                    feature: name.to_string(),
                    weight: if *name == "BMI" { 0.1 } else { 0.0 },
                })
                .collect(),
        }
    }

    fn row_with_bmi(bmi: f32) -> FeatureVector {
        let mut row = [0.0f32; FEATURE_COUNT];
        row[crate::schema::idx::BMI] = bmi;
        FeatureVector::from(row)
    }

    #[test]
    fn logistic_infer() {
        let predictor = LogisticPredictor::new(bmi_only_model(), "bmi-only");
        let p = predictor.predict_proba(&row_with_bmi(25.0)).unwrap();
        assert!((p - 0.5).abs() < 1e-6, "p = {}", p);

        let p = predictor.predict_proba(&row_with_bmi(45.0)).unwrap();
        // sigmoid(2.0)
        assert!((p - 0.880_797).abs() < 1e-5, "p = {}", p);
    }

    #[test]
    fn logistic_exposes_feature_names() {
        let predictor = LogisticPredictor::new(bmi_only_model(), "bmi-only");
        let names = predictor.feature_names().unwrap();
        assert_eq!(names.len(), FEATURE_COUNT);
        assert_eq!(names[3], "BMI");
        assert_eq!(predictor.n_features(), FEATURE_COUNT);
    }

    #[test]
    fn logistic_rejects_arity_mismatch() {
        let mut model = bmi_only_model();
        model.coefficients.truncate(3);
        let predictor = LogisticPredictor::new(model, "short");
        let err = predictor.predict_proba(&row_with_bmi(25.0)).unwrap_err();
        assert_eq!(err, PredictionError::Arity { expected: 3, got: 21 });
    }

    #[test]
    fn logistic_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logistic.json");
        std::fs::write(&path, serde_json::to_string_pretty(&bmi_only_model()).unwrap()).unwrap();
        let predictor = LogisticPredictor::load(&path, "from-disk").unwrap();
        assert_eq!(predictor.name(), "from-disk");
    }

    #[test]
    fn logistic_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logistic.json");
        std::fs::write(&path, "{\"intercept\": 1.0}").unwrap();
        assert!(matches!(
            LogisticPredictor::load(&path, "x"),
            Err(StartupError::ArtifactCorrupt { .. })
        ));
    }
}
