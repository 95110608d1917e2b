use plotly::common::{Line, Marker, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Pie, Plot, Scatter};

use crate::report::presentation::{CurvePoint, ProfileBar, RiskBreakdown};

/// Pie chart of the two-slice probability split.
pub fn plot_risk_distribution(breakdown: &RiskBreakdown) -> Plot {
    let values: Vec<f64> = breakdown.values().iter().map(|v| *v as f64).collect();
    let trace = Pie::new(values)
        .labels(RiskBreakdown::LABELS.to_vec())
        .name("Diabetes Risk")
        .marker(Marker::new().color_array(RiskBreakdown::COLORS.to_vec()));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().title("Diabetes Risk Distribution"));
    plot
}

/// Bar chart of the raw profile values.
pub fn plot_profile(bars: &[ProfileBar]) -> Plot {
    let labels: Vec<&str> = bars.iter().map(|b| b.label).collect();
    let values: Vec<f64> = bars.iter().map(|b| b.value as f64).collect();
    let colors: Vec<&'static str> = bars.iter().map(|b| b.color).collect();

    let trace = Bar::new(labels, values)
        .name("Your profile")
        .marker(Marker::new().color_array(colors));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title("Your Health Profile Summary")
            .y_axis(Axis::new().title("Relative Scale / Group Code")),
    );
    plot
}

/// Line chart of the static example trend.
pub fn plot_reference_curve(points: &[CurvePoint]) -> Plot {
    let x: Vec<u8> = points.iter().map(|p| p.general_health).collect();
    let y: Vec<f64> = points.iter().map(|p| p.average_risk as f64).collect();

    let trace = Scatter::new(x, y)
        .mode(Mode::LinesMarkers)
        .name("Estimated Average Risk")
        .line(Line::new().color("#264653"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title("General Health vs. Diabetes Risk (Example Trend)")
            .x_axis(Axis::new().title("General Health Rating"))
            .y_axis(Axis::new().title("Estimated Average Risk")),
    );
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::presentation::REFERENCE_CURVE;
    use crate::risk::RiskScore;

    #[test]
    fn plots_embed_as_inline_html() {
        let breakdown = RiskBreakdown::new(RiskScore::new(0.25).unwrap());
        let pie = plot_risk_distribution(&breakdown);
        let json = pie.to_json();
        assert!(json.contains("#A8DADC"));
        assert!(json.contains("#E76F51"));
        assert!(json.find("#A8DADC") < json.find("#E76F51"));

        let html = pie.to_inline_html(Some("pie"));
        assert!(html.contains("pie"));
        assert!(html.contains("No Diabetes"));
        assert!(html.contains("#A8DADC"));

        let html = plot_reference_curve(&REFERENCE_CURVE).to_inline_html(Some("trend"));
        assert!(html.contains("General Health vs. Diabetes Risk"));
    }

    #[test]
    fn profile_plot_carries_labels() {
        let bars = vec![
            ProfileBar { label: "BMI", value: 22.0, color: "#457B9D" },
            ProfileBar { label: "Age", value: 3.0, color: "#1D3557" },
        ];
        let json = plot_profile(&bars).to_json();
        assert!(json.contains("BMI"));
        assert!(json.contains("#457B9D"));
    }
}
