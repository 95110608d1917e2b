use crate::error::PredictionError;
use crate::features::FeatureVector;

/// Anything that can turn one fixed-schema row into a positive-class
/// probability.
///
/// Implementations are loaded once at startup and then shared read-only
/// across requests (and threads), so prediction must not mutate state.
pub trait RiskPredictor: Send + Sync {
    /// Probability of the positive ("at risk") class for `row`.
    ///
    /// Range checking happens in the caller; implementations return what the
    /// model produced.
    fn predict_proba(&self, row: &FeatureVector) -> Result<f32, PredictionError>;

    /// Feature names the model was trained on, if the artifact records them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Number of features per row the model expects.
    fn n_features(&self) -> usize;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
