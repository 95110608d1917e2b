//! Feature assembler: `ScreeningInput` -> fixed 21-column row.
//!
//! Only seven columns come from the form. The other fourteen are filled with
//! the constants below for every request. They were picked by hand rather than
//! derived from training-data means or modes, so predictions for people who
//! differ from them (sex, education, income, ...) are skewed.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::input::ScreeningInput;
use crate::schema::{idx, FEATURE_COUNT, FEATURE_NAMES};

/// Constant columns and the value they are filled with.
pub const FILLED_CONSTANTS: [(usize, f32); 14] = [
    (idx::CHOL_CHECK, 1.0),
    (idx::STROKE, 0.0),
    (idx::HEART_DISEASE_OR_ATTACK, 0.0),
    (idx::FRUITS, 1.0),
    (idx::VEGGIES, 1.0),
    (idx::HVY_ALCOHOL_CONSUMP, 0.0),
    (idx::ANY_HEALTHCARE, 1.0),
    (idx::NO_DOCBC_COST, 0.0),
    (idx::MENT_HLTH, 0.0),
    (idx::PHYS_HLTH, 0.0),
    (idx::DIFF_WALK, 0.0),
    (idx::SEX, 0.0),
    (idx::EDUCATION, 5.0),
    (idx::INCOME, 6.0),
];

/// One classifier row, ordered as [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.0.to_vec()
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }

    /// `(name, value)` pairs in column order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }
}

/// Serialized as an ordered `{name: value}` object.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in self.named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Build the classifier row for one input. Deterministic; does not validate
/// (call [`ScreeningInput::validate`] first).
pub fn assemble(input: &ScreeningInput) -> FeatureVector {
    let mut row = [0.0f32; FEATURE_COUNT];
    for (i, value) in FILLED_CONSTANTS {
        row[i] = value;
    }

    row[idx::HIGH_BP] = input.highbp.encode();
    row[idx::HIGH_CHOL] = input.highchol.encode();
    row[idx::BMI] = input.bmi;
    row[idx::SMOKER] = input.smoker.encode();
    row[idx::PHYS_ACTIVITY] = input.phys_activity.encode();
    row[idx::GEN_HLTH] = input.genhlth as f32;
    row[idx::AGE] = input.age as f32;

    FeatureVector(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Answer;

    fn sample() -> ScreeningInput {
        ScreeningInput {
            highbp: Answer::Yes,
            highchol: Answer::Yes,
            bmi: 30.0,
            smoker: Answer::No,
            phys_activity: Answer::Yes,
            genhlth: 4,
            age: 8,
        }
    }

    #[test]
    fn assembles_reference_row() {
        let row = assemble(&sample());
        let expected: [f32; 21] = [
            1.0, 1.0, 1.0, 30.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0, 4.0, 0.0, 0.0, 0.0,
            0.0, 8.0, 5.0, 6.0,
        ];
        assert_eq!(row.as_slice(), &expected);
    }

    #[test]
    fn constants_and_user_columns_are_disjoint() {
        let user = [
            idx::HIGH_BP,
            idx::HIGH_CHOL,
            idx::BMI,
            idx::SMOKER,
            idx::PHYS_ACTIVITY,
            idx::GEN_HLTH,
            idx::AGE,
        ];
        for (i, _) in FILLED_CONSTANTS {
            assert!(!user.contains(&i), "column {} filled twice", i);
        }
        assert_eq!(FILLED_CONSTANTS.len() + user.len(), FEATURE_COUNT);
    }

    #[test]
    fn every_valid_input_keeps_width_and_constants() {
        let answers = [Answer::Yes, Answer::No];
        let bmis = [12.0f32, 18.5, 24.2, 30.0, 45.7, 98.0];
        let flags = [idx::HIGH_BP, idx::HIGH_CHOL, idx::SMOKER, idx::PHYS_ACTIVITY];
        let mut rows = 0;

        for highbp in answers {
            for highchol in answers {
                for smoker in answers {
                    for phys_activity in answers {
                        for genhlth in 1..=5u8 {
                            for age in 1..=13u8 {
                                for bmi in bmis {
                                    let input = ScreeningInput {
                                        highbp,
                                        highchol,
                                        bmi,
                                        smoker,
                                        phys_activity,
                                        genhlth,
                                        age,
                                    };
                                    let row = assemble(&input);
                                    let values = row.as_slice();

                                    assert_eq!(values.len(), FEATURE_COUNT);
                                    for (i, value) in FILLED_CONSTANTS {
                                        assert_eq!(values[i], value, "column {} for {:?}", i, input);
                                    }
                                    for i in flags {
                                        assert!(
                                            values[i] == 0.0 || values[i] == 1.0,
                                            "column {} = {}",
                                            i,
                                            values[i]
                                        );
                                    }
                                    assert_eq!(values[idx::HIGH_BP], highbp.encode());
                                    assert_eq!(values[idx::PHYS_ACTIVITY], phys_activity.encode());
                                    assert_eq!(values[idx::BMI], bmi);
                                    assert_eq!(values[idx::GEN_HLTH], genhlth as f32);
                                    assert_eq!(values[idx::AGE], age as f32);
                                    rows += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(rows, 16 * 5 * 13 * 6);
    }

    #[test]
    fn named_lookup_and_serialization() {
        let row = assemble(&sample());
        assert_eq!(row.get("BMI"), Some(30.0));
        assert_eq!(row.get("Income"), Some(6.0));
        assert_eq!(row.get("Nope"), None);

        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["GenHlth"], 4.0);
        assert_eq!(json.as_object().unwrap().len(), 21);
    }
}
