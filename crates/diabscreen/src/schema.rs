//! The named, versioned column layout the classifier was trained on.
//!
//! Classifiers do not validate the order of their input columns, so a row in
//! the wrong order silently produces a meaningless probability. The layout is
//! therefore spelled out here once and compared against whatever feature names
//! a model artifact declares when it is loaded.

use serde::{Deserialize, Serialize};

use crate::error::StartupError;

pub const FEATURE_COUNT: usize = 21;

pub const SCHEMA_VERSION: &str = "brfss-diabetes-21/v1";

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "HighBP",
    "HighChol",
    "CholCheck",
    "BMI",
    "Smoker",
    "Stroke",
    "HeartDiseaseorAttack",
    "PhysActivity",
    "Fruits",
    "Veggies",
    "HvyAlcoholConsump",
    "AnyHealthcare",
    "NoDocbcCost",
    "GenHlth",
    "MentHlth",
    "PhysHlth",
    "DiffWalk",
    "Sex",
    "Age",
    "Education",
    "Income",
];

/// Column positions inside a [`crate::features::FeatureVector`].
pub mod idx {
    pub const HIGH_BP: usize = 0;
    pub const HIGH_CHOL: usize = 1;
    pub const CHOL_CHECK: usize = 2;
    pub const BMI: usize = 3;
    pub const SMOKER: usize = 4;
    pub const STROKE: usize = 5;
    pub const HEART_DISEASE_OR_ATTACK: usize = 6;
    pub const PHYS_ACTIVITY: usize = 7;
    pub const FRUITS: usize = 8;
    pub const VEGGIES: usize = 9;
    pub const HVY_ALCOHOL_CONSUMP: usize = 10;
    pub const ANY_HEALTHCARE: usize = 11;
    pub const NO_DOCBC_COST: usize = 12;
    pub const GEN_HLTH: usize = 13;
    pub const MENT_HLTH: usize = 14;
    pub const PHYS_HLTH: usize = 15;
    pub const DIFF_WALK: usize = 16;
    pub const SEX: usize = 17;
    pub const AGE: usize = 18;
    pub const EDUCATION: usize = 19;
    pub const INCOME: usize = 20;
}

/// Serializable view of the schema (served by `/api/schema` and `diabscreen schema`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: String,
    pub feature_names: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    /// Position of a named column.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Compare the names a model declares against this schema.
    ///
    /// Names must match exactly and in order. The error names the first
    /// offending position so a reordered artifact is easy to diagnose.
    pub fn check_names<S: AsRef<str>>(&self, declared: &[S]) -> Result<(), StartupError> {
        if declared.len() != self.len() {
            return Err(StartupError::SchemaMismatch {
                expected_version: self.version.clone(),
                detail: format!(
                    "expected {} features, model declares {}",
                    self.len(),
                    declared.len()
                ),
            });
        }

        for (i, (expected, got)) in self.feature_names.iter().zip(declared).enumerate() {
            if expected != got.as_ref() {
                return Err(StartupError::SchemaMismatch {
                    expected_version: self.version.clone(),
                    detail: format!(
                        "column {} is '{}' in the model but '{}' in the schema",
                        i,
                        got.as_ref(),
                        expected
                    ),
                });
            }
        }
        Ok(())
    }

    /// Check a declared schema version, when the artifact carries one.
    pub fn check_version(&self, declared: &str) -> Result<(), StartupError> {
        if declared == self.version {
            Ok(())
        } else {
            Err(StartupError::SchemaMismatch {
                expected_version: self.version.clone(),
                detail: format!("model was built for schema {}", declared),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_has_21_named_columns() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.len(), FEATURE_COUNT);
        assert_eq!(schema.version, SCHEMA_VERSION);
        assert_eq!(schema.index_of("BMI"), Some(idx::BMI));
        assert_eq!(schema.index_of("Age"), Some(idx::AGE));
        assert_eq!(schema.index_of("Income"), Some(idx::INCOME));
    }

    #[test]
    fn check_names_accepts_exact_match() {
        let schema = FeatureSchema::default();
        assert!(schema.check_names(&FEATURE_NAMES).is_ok());
    }

    #[test]
    fn check_names_rejects_reordering() {
        let schema = FeatureSchema::default();
        let mut names = FEATURE_NAMES.to_vec();
        names.swap(0, 1);
        let err = schema.check_names(&names).unwrap_err();
        assert!(err.to_string().contains("column 0"), "{}", err);
    }

    #[test]
    fn check_names_rejects_wrong_count() {
        let schema = FeatureSchema::default();
        let err = schema.check_names(&FEATURE_NAMES[..20]).unwrap_err();
        assert!(err.to_string().contains("expected 21"), "{}", err);
    }

    #[test]
    fn check_version_rejects_other_versions() {
        let schema = FeatureSchema::default();
        assert!(schema.check_version(SCHEMA_VERSION).is_ok());
        assert!(schema.check_version("brfss-diabetes-21/v0").is_err());
    }
}
