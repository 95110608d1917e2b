use std::error::Error;
use std::fmt;

/// Failure while bringing the predictor up. Fatal: the process must not start
/// accepting requests after one of these.
#[derive(Debug)]
pub enum StartupError {
    /// Artifact directory, manifest or model file could not be read.
    ArtifactUnreadable { path: String, reason: String },
    /// Artifact was read but could not be parsed into a model.
    ArtifactCorrupt { path: String, reason: String },
    /// The artifact declares a backend this build does not know.
    UnknownBackend(String),
    /// The artifact's width or declared feature names differ from the schema.
    SchemaMismatch {
        expected_version: String,
        detail: String,
    },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartupError::ArtifactUnreadable { path, reason } => {
                write!(f, "Model artifact {} is unreadable: {}", path, reason)
            }
            StartupError::ArtifactCorrupt { path, reason } => {
                write!(f, "Model artifact {} is corrupt: {}", path, reason)
            }
            StartupError::UnknownBackend(name) => write!(f, "Unknown model backend: {}", name),
            StartupError::SchemaMismatch {
                expected_version,
                detail,
            } => write!(
                f,
                "Model does not match feature schema {}: {}",
                expected_version, detail
            ),
        }
    }
}

impl Error for StartupError {}

/// Input rejected before it reaches the predictor. The message is safe to show
/// to the person filling the form.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
    NotFinite(&'static str),
    Missing(&'static str),
    Unrecognized { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{} must be between {} and {} (got {})",
                field, min, max, value
            ),
            ValidationError::NotFinite(field) => write!(f, "{} must be a finite number", field),
            ValidationError::Missing(field) => write!(f, "{} is required", field),
            ValidationError::Unrecognized { field, value } => {
                write!(f, "{} must be Yes or No (got {:?})", field, value)
            }
        }
    }
}

impl Error for ValidationError {}

/// Per-request failure inside or around the predictor.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Row length differs from what the model was built for.
    Arity { expected: usize, got: usize },
    /// Model produced NaN/inf or a value outside [0, 1].
    MalformedOutput(f32),
    /// Model produced no value for the row.
    EmptyOutput,
    /// Prediction did not finish inside the configured budget.
    Timeout { millis: u64 },
    /// Predictor task died (panic or cancelled).
    Aborted(String),
}

impl PredictionError {
    /// Text shown to users. Internals stay in the log.
    pub const PUBLIC_MESSAGE: &'static str =
        "The risk model could not produce a prediction. Please try again later.";
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictionError::Arity { expected, got } => write!(
                f,
                "Predictor expects {} features per row, got {}",
                expected, got
            ),
            PredictionError::MalformedOutput(v) => {
                write!(f, "Predictor returned an invalid probability: {}", v)
            }
            PredictionError::EmptyOutput => write!(f, "Predictor returned no prediction"),
            PredictionError::Timeout { millis } => {
                write!(f, "Prediction exceeded the {} ms budget", millis)
            }
            PredictionError::Aborted(reason) => write!(f, "Prediction task aborted: {}", reason),
        }
    }
}

impl Error for PredictionError {}

/// Everything that can go wrong for a single screening request.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenError {
    Validation(ValidationError),
    Prediction(PredictionError),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScreenError::Validation(e) => write!(f, "Invalid input: {}", e),
            ScreenError::Prediction(e) => write!(f, "Prediction failed: {}", e),
        }
    }
}

impl Error for ScreenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScreenError::Validation(e) => Some(e),
            ScreenError::Prediction(e) => Some(e),
        }
    }
}

impl From<ValidationError> for ScreenError {
    fn from(e: ValidationError) -> Self {
        ScreenError::Validation(e)
    }
}

impl From<PredictionError> for ScreenError {
    fn from(e: PredictionError) -> Self {
        ScreenError::Prediction(e)
    }
}
