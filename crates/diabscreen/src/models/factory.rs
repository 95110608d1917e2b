use std::path::Path;

use log::{info, warn};

use crate::config::{ModelBackend, ModelManifest};
use crate::error::StartupError;
use crate::models::classifier_trait::RiskPredictor;
use crate::models::gbdt::GbdtPredictor;
use crate::models::logistic::LogisticPredictor;
use crate::schema::FeatureSchema;

/// Load the predictor described by `<dir>/manifest.json` and verify it
/// against `schema`.
///
/// Every failure here is a [`StartupError`]: the caller is expected to stop
/// rather than serve requests with a model it could not verify.
pub fn load_predictor<P: AsRef<Path>>(
    dir: P,
    schema: &FeatureSchema,
) -> Result<Box<dyn RiskPredictor>, StartupError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(StartupError::ArtifactUnreadable {
            path: dir.display().to_string(),
            reason: "model directory not found".to_string(),
        });
    }

    let manifest = ModelManifest::load(dir)?;
    let model_path = manifest.model_path(dir)?;
    info!(
        "Loading {} model '{}' from {}",
        manifest.backend,
        manifest.name,
        model_path.display()
    );

    if let Some(version) = &manifest.schema_version {
        schema.check_version(version)?;
    }

    let predictor: Box<dyn RiskPredictor> = match manifest.backend()? {
        ModelBackend::Gbdt => Box::new(with_declared_names(
            GbdtPredictor::load(&model_path, manifest.name.clone())?,
            &manifest,
        )),
        ModelBackend::Xgboost => Box::new(with_declared_names(
            GbdtPredictor::load_xgboost(&model_path, schema, manifest.name.clone())?,
            &manifest,
        )),
        ModelBackend::Logistic => {
            let predictor = LogisticPredictor::load(&model_path, manifest.name.clone())?;
            if let Some(names) = &manifest.feature_names {
                schema.check_names(names)?;
            }
            Box::new(predictor)
        }
    };

    verify_schema(predictor.as_ref(), schema)?;
    Ok(predictor)
}

fn with_declared_names(predictor: GbdtPredictor, manifest: &ModelManifest) -> GbdtPredictor {
    match &manifest.feature_names {
        Some(names) => predictor.with_feature_names(names.clone()),
        None => predictor,
    }
}

/// Fail fast when a predictor's declared columns differ from the schema.
///
/// Predictors that do not record their training columns can only be checked
/// for width; that is logged, since a reordered artifact would go unnoticed.
pub fn verify_schema(predictor: &dyn RiskPredictor, schema: &FeatureSchema) -> Result<(), StartupError> {
    if predictor.n_features() != schema.len() {
        return Err(StartupError::SchemaMismatch {
            expected_version: schema.version.clone(),
            detail: format!(
                "model expects {} features, schema has {}",
                predictor.n_features(),
                schema.len()
            ),
        });
    }

    match predictor.feature_names() {
        Some(names) => {
            schema.check_names(names)?;
            info!(
                "Model '{}' matches feature schema {}",
                predictor.name(),
                schema.version
            );
        }
        None => warn!(
            "Model '{}' does not declare feature names; column order against schema {} cannot be verified",
            predictor.name(),
            schema.version
        ),
    }
    Ok(())
}
