//! Display values derived from a risk score, and their HTML/plotly rendering.
pub mod page;
pub mod plots;
pub mod presentation;

pub use presentation::{CurvePoint, Presentation, ProfileBar, RiskBreakdown, REFERENCE_CURVE};
