//! CSV batch screening.
//!
//! Input columns: `highbp, highchol, bmi, smoker, phys_activity, genhlth, age`
//! (yes/no columns accept `Yes`/`No` or `1`/`0`). The output repeats the input
//! and appends `risk_score`, `verdict` and `error`. A bad row does not stop
//! the batch; its `error` column says why.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::input::{Answer, ScreeningInput};
use crate::screener::{ScreeningOutcome, Screener};

/// One parsed input line. `line` is 1-based and excludes the header.
#[derive(Debug, Clone)]
pub struct InputRow {
    pub line: usize,
    pub input: Result<ScreeningInput, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub high_risk: usize,
    pub low_risk: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct OutputRecord {
    row: usize,
    highbp: Option<Answer>,
    highchol: Option<Answer>,
    bmi: Option<f32>,
    smoker: Option<Answer>,
    phys_activity: Option<Answer>,
    genhlth: Option<u8>,
    age: Option<u8>,
    risk_score: Option<f32>,
    verdict: Option<&'static str>,
    error: Option<String>,
}

impl OutputRecord {
    fn new(row: &InputRow, result: &Result<ScreeningOutcome, String>) -> Self {
        let input = row.input.as_ref().ok();
        let (risk_score, verdict, error) = match result {
            Ok(outcome) => (
                Some(outcome.risk_score.value()),
                Some(outcome.verdict.label()),
                None,
            ),
            Err(e) => (None, None, Some(e.clone())),
        };
        OutputRecord {
            row: row.line,
            highbp: input.map(|i| i.highbp),
            highchol: input.map(|i| i.highchol),
            bmi: input.map(|i| i.bmi),
            smoker: input.map(|i| i.smoker),
            phys_activity: input.map(|i| i.phys_activity),
            genhlth: input.map(|i| i.genhlth),
            age: input.map(|i| i.age),
            risk_score,
            verdict,
            error,
        }
    }
}

/// Read every row of a screening CSV. Rows that fail to deserialize are kept
/// with their error so the output lines up with the input.
pub fn read_inputs<P: AsRef<Path>>(path: P) -> Result<Vec<InputRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open screening CSV: {}", path.as_ref().display()))?;

    let rows = reader
        .deserialize::<ScreeningInput>()
        .enumerate()
        .map(|(i, record)| InputRow {
            line: i + 1,
            input: record.map_err(|e| e.to_string()),
        })
        .collect();
    Ok(rows)
}

/// Write one output line per input row.
pub fn write_outcomes<W: Write>(
    writer: W,
    rows: &[InputRow],
    results: &[Result<ScreeningOutcome, String>],
) -> Result<BatchSummary> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for (row, result) in rows.iter().zip(results) {
        summary.total += 1;
        match result {
            Ok(outcome) if outcome.risk_score.verdict() == crate::risk::Verdict::HighRisk => {
                summary.high_risk += 1
            }
            Ok(_) => summary.low_risk += 1,
            Err(_) => summary.failed += 1,
        }
        wtr.serialize(OutputRecord::new(row, result))
            .with_context(|| format!("Failed to write output row {}", row.line))?;
    }
    wtr.flush().context("Failed to flush output CSV")?;
    Ok(summary)
}

/// Screen every row of `input_path` in parallel and write the results.
pub fn screen_csv<P: AsRef<Path>, W: Write>(
    screener: &Screener,
    input_path: P,
    output: W,
) -> Result<BatchSummary> {
    let rows = read_inputs(&input_path)?;
    info!(
        "Screening {} rows from {}",
        rows.len(),
        input_path.as_ref().display()
    );

    let results: Vec<Result<ScreeningOutcome, String>> = rows
        .par_iter()
        .map(|row| match &row.input {
            Ok(input) => screener.screen(input).map_err(|e| e.to_string()),
            Err(e) => Err(e.clone()),
        })
        .collect();

    let summary = write_outcomes(output, &rows, &results)?;
    if summary.failed > 0 {
        warn!("{} of {} rows could not be screened", summary.failed, summary.total);
    }
    Ok(summary)
}
