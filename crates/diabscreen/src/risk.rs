use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

/// Probabilities strictly above this are reported as high risk. Fixed and
/// uncalibrated.
pub const HIGH_RISK_THRESHOLD: f32 = 0.5;

/// Positive-class probability, guaranteed finite and inside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RiskScore(f32);

impl RiskScore {
    /// Accept a raw predictor output. Anything outside [0, 1] means the
    /// predictor is broken, not that the person is extreme.
    pub fn new(p: f32) -> Result<Self, PredictionError> {
        if p.is_finite() && (0.0..=1.0).contains(&p) {
            Ok(RiskScore(p))
        } else {
            Err(PredictionError::MalformedOutput(p))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn complement(self) -> f32 {
        1.0 - self.0
    }

    pub fn verdict(self) -> Verdict {
        if self.0 > HIGH_RISK_THRESHOLD {
            Verdict::HighRisk
        } else {
            Verdict::LowRisk
        }
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "high risk")]
    HighRisk,
    #[serde(rename = "low risk")]
    LowRisk,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::HighRisk => "high risk",
            Verdict::LowRisk => "low risk",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Verdict::HighRisk => "You are at high risk. Please consult your healthcare provider.",
            Verdict::LowRisk => "Your risk is low. Keep maintaining a healthy lifestyle!",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
