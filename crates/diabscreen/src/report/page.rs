//! maud templates for the form, the results area and the standalone report.

use chrono::{DateTime, TimeZone};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::input::{Answer, ScreeningForm, AGE_GROUP_LABELS, GENERAL_HEALTH_LABELS};
use crate::report::plots::{plot_profile, plot_reference_curve, plot_risk_distribution};
use crate::risk::Verdict;
use crate::screener::ScreeningOutcome;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const STYLE: &str = "
body { font-family: sans-serif; max-width: 760px; margin: 2em auto; color: #1d3557; }
fieldset { border: 1px solid #ccc; border-radius: 5px; margin-bottom: 1em; }
label { display: block; margin: .4em 0; }
.columns { display: flex; gap: 2em; }
.metric { font-size: 2.4em; font-weight: bold; }
.alert { padding: .8em; border-radius: 5px; }
.alert-high { background: #fde2dc; color: #8a2a12; }
.alert-low { background: #dff3ea; color: #1d5e41; }
.alert-error { background: #fff3cd; color: #7a5b00; }
.chart { margin: 1.5em 0; }
footer { margin-top: 2em; font-size: .85em; color: #666; }
";

pub const TITLE: &str = "Diabetes Risk Screening Tool";

const INTRO: &str = "This tool estimates an individual's risk of developing diabetes using \
lifestyle, health, and demographic indicators. It supports early intervention and healthcare \
planning. Input your details below to check your risk level.";

const CAPTION: &str = "Developed for educational and preventive awareness purposes. \
Data source: public health indicators.";

fn layout(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (TITLE) }
                style { (PreEscaped(STYLE)) }
                script src=(PLOTLY_JS) {}
            }
            body {
                h1 { (TITLE) }
                (body)
                footer { hr; (CAPTION) }
            }
        }
    }
}

fn yes_no(name: &str, legend: &str, current: Answer) -> Markup {
    html! {
        fieldset {
            legend { (legend) }
            @for answer in [Answer::Yes, Answer::No] {
                label {
                    input type="radio" name=(name) value=(answer.as_str()) checked[answer == current];
                    " " (answer.as_str())
                }
            }
        }
    }
}

fn form_fields(form: &ScreeningForm) -> Markup {
    html! {
        form method="post" action="/screen" {
            h2 { "Calculate Your BMI" }
            label {
                "Height (in cm) "
                input type="number" name="height_cm" min="100" max="250" step="1" value=(form.height_cm) required;
            }
            label {
                "Weight (in kg) "
                input type="number" name="weight_kg" min="30" max="200" step="1" value=(form.weight_kg) required;
            }

            h2 { "Input Your Health Information" }
            div class="columns" {
                div {
                    label {
                        "Age Group "
                        select name="age" {
                            @for (i, label) in AGE_GROUP_LABELS.iter().enumerate() {
                                @let code = i as u8 + 1;
                                option value=(code) selected[code == form.age] {
                                    (label) " (Code " (code) ")"
                                }
                            }
                        }
                    }
                    (yes_no("phys_activity", "Physically Active?", form.phys_activity))
                    label {
                        "General Health (1=Excellent, 5=Poor) "
                        select name="genhlth" {
                            @for (i, label) in GENERAL_HEALTH_LABELS.iter().enumerate() {
                                @let rating = i as u8 + 1;
                                option value=(rating) selected[rating == form.genhlth] {
                                    (rating) " - " (label)
                                }
                            }
                        }
                    }
                    (yes_no("smoker", "Do you smoke?", form.smoker))
                }
                div {
                    (yes_no("highbp", "High Blood Pressure?", form.highbp))
                    (yes_no("highchol", "High Cholesterol?", form.highchol))
                }
            }
            button type="submit" { "Check My Diabetes Risk" }
        }
    }
}

/// The input form, optionally with a validation message above it.
pub fn form_page(form: &ScreeningForm, error: Option<&str>) -> Markup {
    layout(html! {
        p { (INTRO) }
        @if let Some(message) = error {
            div class="alert alert-error" role="alert" { (message) }
        }
        (form_fields(form))
    })
}

/// Metric, verdict and the three charts for one outcome.
pub fn results_section(outcome: &ScreeningOutcome) -> Markup {
    let pres = &outcome.presentation;
    let alert_class = match pres.verdict {
        Verdict::HighRisk => "alert alert-high",
        Verdict::LowRisk => "alert alert-low",
    };
    let pie = plot_risk_distribution(&pres.breakdown).to_inline_html(Some("risk-distribution"));
    let bars = plot_profile(&pres.profile).to_inline_html(Some("profile-summary"));
    let trend = plot_reference_curve(&pres.reference_curve).to_inline_html(Some("reference-trend"));

    html! {
        section id="results" {
            h2 { "Diabetes Risk Result" }
            p { "Your calculated BMI is: " (outcome.input.bmi) }
            div {
                div { "Predicted Diabetes Risk Score" }
                div class="metric" { (pres.metric) }
            }
            div class=(alert_class) role="status" { (pres.verdict.message()) }

            h2 { "Visual Breakdown" }
            div class="chart" { (PreEscaped(pie)) }

            h2 { "Contributing Factors Overview" }
            div class="chart" { (PreEscaped(bars)) }

            h2 { "Risk vs. General Health Example" }
            div class="chart" { (PreEscaped(trend)) }

            h3 { "Model Used: " (outcome.model) }
            p {
                "Feature schema " code { (outcome.schema_version) }
                ". The example trend is illustrative and not derived from this model."
            }
        }
    }
}

/// Form (pre-filled with what was submitted) followed by the results.
pub fn result_page(form: &ScreeningForm, outcome: &ScreeningOutcome) -> Markup {
    layout(html! {
        p { (INTRO) }
        (form_fields(form))
        (results_section(outcome))
    })
}

/// Standalone HTML report for a one-shot screening.
pub fn report_page<Tz: TimeZone>(outcome: &ScreeningOutcome, generated_at: &DateTime<Tz>) -> Markup
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S %:z").to_string();
    layout(html! {
        p { "Report generated " (stamp) "." }
        (results_section(outcome))
    })
}
