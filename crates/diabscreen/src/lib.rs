//! diabscreen: diabetes risk screening around a pre-trained classifier.
//!
//! A handful of yes/no, BMI, general-health and age-group answers are turned
//! into the fixed 21-column row the classifier was trained on, passed to a
//! [`models::RiskPredictor`] loaded once at startup, and the resulting
//! probability is presented as a verdict plus three charts.
//!
//! The classifier is an external artifact (see [`config::ModelManifest`]).
//! This crate does no training and makes no accuracy claims.
pub mod config;
pub mod error;
pub mod features;
pub mod input;
pub mod io;
pub mod models;
pub mod report;
pub mod risk;
pub mod schema;
pub mod screener;

pub use error::{PredictionError, ScreenError, StartupError, ValidationError};
pub use features::{assemble, FeatureVector};
pub use input::{Answer, ScreeningForm, ScreeningInput};
pub use risk::{RiskScore, Verdict};
pub use schema::FeatureSchema;
pub use screener::{Screener, ScreeningOutcome};
