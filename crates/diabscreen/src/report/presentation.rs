use serde::Serialize;

use crate::input::ScreeningInput;
use crate::risk::{RiskScore, Verdict};

/// One point of the illustrative "general health vs. risk" trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub general_health: u8,
    pub average_risk: f32,
}

/// Static example trend. Not derived from the model or any dataset; it is the
/// same for every request.
pub const REFERENCE_CURVE: [CurvePoint; 5] = [
    CurvePoint { general_health: 1, average_risk: 0.1 },
    CurvePoint { general_health: 2, average_risk: 0.2 },
    CurvePoint { general_health: 3, average_risk: 0.4 },
    CurvePoint { general_health: 4, average_risk: 0.6 },
    CurvePoint { general_health: 5, average_risk: 0.75 },
];

/// Two-slice split of the probability for the pie chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskBreakdown {
    pub at_risk: f32,
    pub no_diabetes: f32,
}

impl RiskBreakdown {
    pub const LABELS: [&'static str; 2] = ["No Diabetes", "At Risk"];
    pub const COLORS: [&'static str; 2] = ["#A8DADC", "#E76F51"];

    pub fn new(score: RiskScore) -> Self {
        RiskBreakdown {
            at_risk: score.value(),
            no_diabetes: score.complement(),
        }
    }

    /// Values in [`Self::LABELS`] order.
    pub fn values(&self) -> [f32; 2] {
        [self.no_diabetes, self.at_risk]
    }
}

/// One bar of the profile summary. Values are raw and in mixed units
/// (kg/m², age code, 0/1 flags, 1-5 rating); the chart juxtaposes them and
/// says nothing about feature importance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBar {
    pub label: &'static str,
    pub value: f32,
    pub color: &'static str,
}

fn profile_bars(input: &ScreeningInput) -> Vec<ProfileBar> {
    vec![
        ProfileBar { label: "BMI", value: input.bmi, color: "#457B9D" },
        ProfileBar { label: "Age", value: input.age as f32, color: "#1D3557" },
        ProfileBar { label: "Smoker", value: input.smoker.encode(), color: "#E76F51" },
        ProfileBar {
            label: "Physical Activity",
            value: input.phys_activity.encode(),
            color: "#2A9D8F",
        },
        ProfileBar {
            label: "General Health",
            value: input.genhlth as f32,
            color: "#F4A261",
        },
    ]
}

/// Everything the results area shows besides the input echo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    /// Probability formatted with two decimals.
    pub metric: String,
    pub verdict: Verdict,
    pub breakdown: RiskBreakdown,
    pub profile: Vec<ProfileBar>,
    pub reference_curve: Vec<CurvePoint>,
}

impl Presentation {
    pub fn new(score: RiskScore, input: &ScreeningInput) -> Self {
        Presentation {
            metric: score.to_string(),
            verdict: score.verdict(),
            breakdown: RiskBreakdown::new(score),
            profile: profile_bars(input),
            reference_curve: REFERENCE_CURVE.to_vec(),
        }
    }
}
