//! Request path: validate -> assemble -> predict -> present.

use std::path::Path;

use log::{debug, error};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{PredictionError, ScreenError, StartupError};
use crate::features::{assemble, FeatureVector};
use crate::input::ScreeningInput;
use crate::models::factory::{load_predictor, verify_schema};
use crate::models::RiskPredictor;
use crate::report::Presentation;
use crate::risk::{RiskScore, Verdict};
use crate::schema::FeatureSchema;

/// Everything returned for one screening.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutcome {
    pub input: ScreeningInput,
    pub risk_score: RiskScore,
    pub verdict: Verdict,
    pub message: &'static str,
    pub features: FeatureVector,
    pub presentation: Presentation,
    pub model: String,
    pub schema_version: String,
}

/// A loaded, verified predictor plus the schema it was checked against.
///
/// Built once at startup and shared read-only; `screen` takes `&self`.
pub struct Screener {
    predictor: Box<dyn RiskPredictor>,
    schema: FeatureSchema,
}

impl Screener {
    /// Wrap an already constructed predictor, verifying its schema.
    pub fn new(predictor: Box<dyn RiskPredictor>) -> Result<Self, StartupError> {
        let schema = FeatureSchema::default();
        verify_schema(predictor.as_ref(), &schema)?;
        Ok(Screener { predictor, schema })
    }

    /// Load the model artifact directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StartupError> {
        let schema = FeatureSchema::default();
        let predictor = load_predictor(dir, &schema)?;
        Ok(Screener { predictor, schema })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.predictor.name()
    }

    /// Run the predictor on an assembled row and range-check the result.
    pub fn predict(&self, row: &FeatureVector) -> Result<RiskScore, PredictionError> {
        let p = self.predictor.predict_proba(row)?;
        RiskScore::new(p)
    }

    pub fn screen(&self, input: &ScreeningInput) -> Result<ScreeningOutcome, ScreenError> {
        input.validate()?;
        let features = assemble(input);
        debug!("Assembled feature row: {:?}", features.as_slice());

        let risk_score = self.predict(&features).map_err(|e| {
            error!("Model '{}' failed: {}", self.model_name(), e);
            e
        })?;
        Ok(self.outcome(input.clone(), features, risk_score))
    }

    /// Build the response for a score that was computed elsewhere (e.g. on a
    /// blocking worker under a timeout).
    pub fn outcome(
        &self,
        input: ScreeningInput,
        features: FeatureVector,
        risk_score: RiskScore,
    ) -> ScreeningOutcome {
        let verdict = risk_score.verdict();
        let presentation = Presentation::new(risk_score, &input);
        ScreeningOutcome {
            input,
            risk_score,
            verdict,
            message: verdict.message(),
            features,
            presentation,
            model: self.model_name().to_string(),
            schema_version: self.schema.version.clone(),
        }
    }

    /// Screen many inputs in parallel. Results keep the input order.
    pub fn screen_batch(
        &self,
        inputs: &[ScreeningInput],
    ) -> Vec<Result<ScreeningOutcome, ScreenError>> {
        inputs.par_iter().map(|input| self.screen(input)).collect()
    }
}
