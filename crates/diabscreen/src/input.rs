//! User-supplied screening answers.
//!
//! `ScreeningInput` is what the feature assembler consumes. `ScreeningForm` is
//! the browser payload, which carries height and weight instead of a BMI and is
//! converted with [`ScreeningForm::into_input`].

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// BMI range accepted by the screener. Matches the range present in the
/// health survey data the classifier family is trained on.
pub const BMI_RANGE: RangeInclusive<f32> = 12.0..=98.0;
pub const HEIGHT_CM_RANGE: RangeInclusive<f32> = 100.0..=250.0;
pub const WEIGHT_KG_RANGE: RangeInclusive<f32> = 30.0..=200.0;
pub const GENERAL_HEALTH_RANGE: RangeInclusive<u8> = 1..=5;
pub const AGE_GROUP_RANGE: RangeInclusive<u8> = 1..=13;

/// Display labels for the 13 age-group codes, index = code - 1.
pub const AGE_GROUP_LABELS: [&str; 13] = [
    "18-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54", "55-59", "60-64", "65-69",
    "70-74", "75-79", "80+",
];

/// Display labels for the general-health rating, index = rating - 1.
pub const GENERAL_HEALTH_LABELS: [&str; 5] = ["Excellent", "Very good", "Good", "Fair", "Poor"];

/// Label for an age-group code, `None` when the code is out of range.
pub fn age_group_label(code: u8) -> Option<&'static str> {
    if AGE_GROUP_RANGE.contains(&code) {
        Some(AGE_GROUP_LABELS[(code - 1) as usize])
    } else {
        None
    }
}

pub fn general_health_label(rating: u8) -> Option<&'static str> {
    if GENERAL_HEALTH_RANGE.contains(&rating) {
        Some(GENERAL_HEALTH_LABELS[(rating - 1) as usize])
    } else {
        None
    }
}

/// Body-mass index from height and weight, rounded to one decimal.
pub fn bmi(height_cm: f32, weight_kg: f32) -> f32 {
    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    (raw * 10.0).round() / 10.0
}

/// A yes/no answer. Encodes to exactly 1.0 (Yes) or 0.0 (No).
///
/// Accepts `"Yes"`/`"No"` in any case, `"1"`/`"0"`, booleans and the integers
/// 1/0, so both the text and the numeric form encodings deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AnswerRepr")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn encode(self) -> f32 {
        match self {
            Answer::Yes => 1.0,
            Answer::No => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Answer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "1" | "true" => Ok(Answer::Yes),
            "no" | "n" | "0" | "false" => Ok(Answer::No),
            _ => Err(ValidationError::Unrecognized {
                field: "answer",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl TryFrom<AnswerRepr> for Answer {
    type Error = ValidationError;

    fn try_from(repr: AnswerRepr) -> Result<Self, Self::Error> {
        match repr {
            AnswerRepr::Bool(b) => Ok(Answer::from(b)),
            AnswerRepr::Int(1) => Ok(Answer::Yes),
            AnswerRepr::Int(0) => Ok(Answer::No),
            AnswerRepr::Int(other) => Err(ValidationError::Unrecognized {
                field: "answer",
                value: other.to_string(),
            }),
            AnswerRepr::Text(s) => s.parse(),
        }
    }
}

/// The answers one person submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningInput {
    pub highbp: Answer,
    pub highchol: Answer,
    pub bmi: f32,
    pub smoker: Answer,
    pub phys_activity: Answer,
    /// 1 = Excellent .. 5 = Poor
    pub genhlth: u8,
    /// Age-group code 1..=13
    pub age: u8,
}

impl ScreeningInput {
    /// Reject out-of-domain values before anything reaches the predictor.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.bmi.is_finite() {
            return Err(ValidationError::NotFinite("BMI"));
        }
        check_range("BMI", self.bmi, &BMI_RANGE)?;
        check_range("General health", self.genhlth, &GENERAL_HEALTH_RANGE)?;
        check_range("Age group", self.age, &AGE_GROUP_RANGE)?;
        Ok(())
    }

    pub fn age_label(&self) -> Option<&'static str> {
        age_group_label(self.age)
    }
}

fn check_range<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }
}

/// Browser form payload: BMI is derived from height and weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningForm {
    pub height_cm: f32,
    pub weight_kg: f32,
    pub age: u8,
    pub phys_activity: Answer,
    pub genhlth: u8,
    pub smoker: Answer,
    pub highbp: Answer,
    pub highchol: Answer,
}

impl Default for ScreeningForm {
    fn default() -> Self {
        Self {
            height_cm: 170.0,
            weight_kg: 70.0,
            age: 1,
            phys_activity: Answer::Yes,
            genhlth: 3,
            smoker: Answer::Yes,
            highbp: Answer::Yes,
            highchol: Answer::Yes,
        }
    }
}

impl ScreeningForm {
    pub fn bmi(&self) -> f32 {
        bmi(self.height_cm, self.weight_kg)
    }

    /// BMI after checking only height and weight. The result may still fall
    /// outside [`BMI_RANGE`]; the calculator reports it as is.
    pub fn checked_bmi(&self) -> Result<f32, ValidationError> {
        if !self.height_cm.is_finite() {
            return Err(ValidationError::NotFinite("Height"));
        }
        if !self.weight_kg.is_finite() {
            return Err(ValidationError::NotFinite("Weight"));
        }
        check_range("Height (cm)", self.height_cm, &HEIGHT_CM_RANGE)?;
        check_range("Weight (kg)", self.weight_kg, &WEIGHT_KG_RANGE)?;
        Ok(self.bmi())
    }

    /// Check height/weight, compute the BMI and validate the resulting input.
    pub fn into_input(self) -> Result<ScreeningInput, ValidationError> {
        let bmi = self.checked_bmi()?;
        let input = ScreeningInput {
            highbp: self.highbp,
            highchol: self.highchol,
            bmi,
            smoker: self.smoker,
            phys_activity: self.phys_activity,
            genhlth: self.genhlth,
            age: self.age,
        };
        input.validate()?;
        Ok(input)
    }
}
