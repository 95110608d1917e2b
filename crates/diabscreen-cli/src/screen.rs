//! One-shot screening from command line answers.

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::Path;

use diabscreen::input::{Answer, ScreeningForm, ScreeningInput};
use diabscreen::report::page::report_page;
use diabscreen::{Screener, ScreeningOutcome};

use crate::util::write_bytes_to_file;

fn answer(matches: &ArgMatches, id: &'static str) -> Result<Answer> {
    let raw = matches
        .get_one::<String>(id)
        .with_context(|| format!("--{} is required", id.replace('_', "-")))?;
    raw.parse::<Answer>()
        .with_context(|| format!("Invalid value for --{}", id.replace('_', "-")))
}

/// Build a `ScreeningInput` from `screen` arguments. BMI comes from `--bmi`
/// or is computed from `--height-cm` and `--weight-kg`.
pub fn input_from_arguments(matches: &ArgMatches) -> Result<ScreeningInput> {
    let highbp = answer(matches, "highbp")?;
    let highchol = answer(matches, "highchol")?;
    let smoker = answer(matches, "smoker")?;
    let phys_activity = answer(matches, "phys_activity")?;
    let genhlth = *matches.get_one::<u8>("genhlth").context("--genhlth is required")?;
    let age = *matches.get_one::<u8>("age").context("--age is required")?;

    let height = matches.get_one::<f32>("height_cm").copied();
    let weight = matches.get_one::<f32>("weight_kg").copied();

    let input = match (matches.get_one::<f32>("bmi").copied(), height, weight) {
        (Some(bmi), _, _) => ScreeningInput {
            highbp,
            highchol,
            bmi,
            smoker,
            phys_activity,
            genhlth,
            age,
        },
        (None, Some(height_cm), Some(weight_kg)) => ScreeningForm {
            height_cm,
            weight_kg,
            age,
            phys_activity,
            genhlth,
            smoker,
            highbp,
            highchol,
        }
        .into_input()?,
        _ => anyhow::bail!("Provide either --bmi or both --height-cm and --weight-kg"),
    };

    input.validate()?;
    Ok(input)
}

/// BMI from height and weight. Only height and weight are range checked, so
/// a BMI outside the screening range is still printed.
pub fn bmi_from_arguments(height_cm: f32, weight_kg: f32) -> Result<f32> {
    let form = ScreeningForm {
        height_cm,
        weight_kg,
        ..ScreeningForm::default()
    };
    Ok(form.checked_bmi()?)
}

pub fn run_screen(screener: &Screener, input: &ScreeningInput) -> Result<ScreeningOutcome> {
    let outcome = screener.screen(input)?;
    log::info!(
        "[diabscreen::screen] Risk score {} ({})",
        outcome.risk_score,
        outcome.verdict.label()
    );
    Ok(outcome)
}

pub fn write_report(outcome: &ScreeningOutcome, path: &Path) -> Result<()> {
    let html = report_page(outcome, &chrono::Local::now()).into_string();
    write_bytes_to_file(path, html.as_bytes())
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    log::info!("[diabscreen::screen] Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn screen_command() -> Command {
        let mut cmd = Command::new("screen");
        for (id, long) in [
            ("highbp", "highbp"),
            ("highchol", "highchol"),
            ("smoker", "smoker"),
            ("phys_activity", "phys-activity"),
        ] {
            cmd = cmd.arg(Arg::new(id).long(long));
        }
        cmd.arg(Arg::new("bmi").long("bmi").value_parser(clap::value_parser!(f32)))
            .arg(Arg::new("height_cm").long("height-cm").value_parser(clap::value_parser!(f32)))
            .arg(Arg::new("weight_kg").long("weight-kg").value_parser(clap::value_parser!(f32)))
            .arg(Arg::new("genhlth").long("genhlth").value_parser(clap::value_parser!(u8)))
            .arg(Arg::new("age").long("age").value_parser(clap::value_parser!(u8)))
    }

    const ANSWERS: [&str; 8] = [
        "--highbp", "yes", "--highchol", "Yes", "--smoker", "no", "--phys-activity", "1",
    ];

    #[test]
    fn input_with_explicit_bmi() {
        let mut args = vec!["screen"];
        args.extend(ANSWERS);
        args.extend(["--bmi", "30", "--genhlth", "4", "--age", "8"]);
        let matches = screen_command().try_get_matches_from(args).unwrap();

        let input = input_from_arguments(&matches).unwrap();
        assert_eq!(input.highbp, Answer::Yes);
        assert_eq!(input.smoker, Answer::No);
        assert_eq!(input.phys_activity, Answer::Yes);
        assert_eq!(input.bmi, 30.0);
    }

    #[test]
    fn input_with_height_and_weight() {
        let mut args = vec!["screen"];
        args.extend(ANSWERS);
        args.extend(["--height-cm", "180", "--weight-kg", "81", "--genhlth", "2", "--age", "5"]);
        let matches = screen_command().try_get_matches_from(args).unwrap();

        let input = input_from_arguments(&matches).unwrap();
        assert_eq!(input.bmi, 25.0);
    }

    #[test]
    fn input_requires_some_bmi_source() {
        let mut args = vec!["screen"];
        args.extend(ANSWERS);
        args.extend(["--height-cm", "180", "--genhlth", "2", "--age", "5"]);
        let matches = screen_command().try_get_matches_from(args).unwrap();
        assert!(input_from_arguments(&matches).is_err());
    }

    #[test]
    fn bmi_rejects_implausible_weight() {
        assert_eq!(bmi_from_arguments(170.0, 70.0).unwrap(), 24.2);
        assert!(bmi_from_arguments(170.0, 700.0).is_err());
    }

    #[test]
    fn bmi_outside_screening_range_is_still_reported() {
        assert_eq!(bmi_from_arguments(250.0, 30.0).unwrap(), 4.8);
        assert_eq!(bmi_from_arguments(100.0, 200.0).unwrap(), 200.0);
    }
}
