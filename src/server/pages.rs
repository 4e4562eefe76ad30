use std::fmt::Write;

use crate::analysis::{ConformanceAnalysis, PatternAnalysis, ProcessMetrics, detect_bottlenecks};
use crate::core::types::DashboardVariant;
use crate::reporting::index::escape_html;
use crate::server::state::LoadedLog;

/// Rows shown in the activity table
const ACTIVITY_ROWS: usize = 20;

fn title(variant: DashboardVariant) -> &'static str {
    match variant {
        DashboardVariant::Minimal => "Educational Process Mining - Minimal",
        DashboardVariant::Enhanced => "Educational Process Mining - Enhanced",
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn stat(value: &str, label: &str) -> String {
    format!(
        r#"<div class="stat"><div class="value">{}</div><div>{}</div></div>"#,
        escape_html(value),
        escape_html(label)
    )
}

fn status_section(data: &LoadedLog) -> String {
    match &data.error {
        Some(error) => format!(
            r#"<div class="alert error">Failed to load {}: {}</div>"#,
            escape_html(&data.source),
            escape_html(error)
        ),
        None if data.is_empty() => format!(
            r#"<div class="alert info">No events in {}. Point <code>--data</code> or <code>EPM_DATA</code> at a dataset, CSV or XES log.</div>"#,
            escape_html(&data.source)
        ),
        None => format!(
            r#"<div class="alert ok">Loaded {} events from {}</div>"#,
            data.log.len(),
            escape_html(&data.source)
        ),
    }
}

fn metrics_section(metrics: &ProcessMetrics) -> String {
    let cards = [
        stat(&metrics.total_cases.to_string(), "Total Cases"),
        stat(&metrics.unique_activities.to_string(), "Unique Activities"),
        stat(
            &format!("{:.2} days", metrics.avg_case_duration),
            "Avg Case Duration",
        ),
        stat(&metrics.variants.to_string(), "Variants"),
    ];
    let rows: Vec<Vec<String>> = metrics
        .activity_counts
        .iter()
        .take(ACTIVITY_ROWS)
        .map(|(activity, count)| vec![activity.clone(), count.to_string()])
        .collect();
    format!(
        r#"<section><h2>Summary Metrics</h2><div class="stats">{}</div>
<h3>Activity Frequency</h3>{}</section>"#,
        cards.join(""),
        table(&["Activity", "Count"], &rows)
    )
}

fn bottleneck_section(data: &LoadedLog) -> String {
    let rows: Vec<Vec<String>> = detect_bottlenecks(&data.log)
        .into_iter()
        .map(|b| {
            vec![
                b.element,
                b.metric.to_string(),
                b.value_formatted,
                b.occurrences.to_string(),
            ]
        })
        .collect();
    format!(
        "<section><h2>Bottlenecks</h2>{}</section>",
        table(&["Element", "Metric", "Average", "Occurrences"], &rows)
    )
}

fn pattern_section(data: &LoadedLog) -> String {
    let patterns = PatternAnalysis::compute(&data.log);
    let variants: Vec<Vec<String>> = patterns
        .variant_distribution
        .into_iter()
        .map(|v| vec![v.variant, v.count.to_string(), v.activities])
        .collect();
    let sequences: Vec<Vec<String>> = patterns
        .common_sequences
        .into_iter()
        .map(|s| vec![s.sequence, s.frequency.to_string()])
        .collect();
    let rework: Vec<Vec<String>> = patterns
        .rework_patterns
        .into_iter()
        .map(|r| vec![r.activity, r.rework_count.to_string()])
        .collect();
    let anomalies: Vec<Vec<String>> = patterns
        .anomalies
        .into_iter()
        .map(|a| vec![a.case_id, a.length.to_string(), a.reason])
        .collect();
    format!(
        r#"<section><h2>Process Patterns</h2>
<h3>Variants</h3>{}
<h3>Common Sequences</h3>{}
<h3>Rework</h3>{}
<h3>Anomalies</h3>{}</section>"#,
        table(&["Variant", "Cases", "Activities"], &variants),
        table(&["Sequence", "Frequency"], &sequences),
        table(&["Activity", "Repeats"], &rework),
        table(&["Case", "Length", "Reason"], &anomalies)
    )
}

fn conformance_section(data: &LoadedLog) -> String {
    let summary = ConformanceAnalysis::run(&data.log).summary();
    let cards = [
        stat(&summary.cases.to_string(), "Cases"),
        stat(&format!("{:.3}", summary.avg_sequence), "Sequence Conformance"),
        stat(
            &format!("{:.3}", summary.avg_behavioral),
            "Behavioral Conformance",
        ),
        stat(&summary.best_practice_cases.to_string(), "Best-practice Cases"),
    ];
    let rows: Vec<Vec<String>> = summary
        .deviations
        .iter()
        .map(|d| vec![d.title.to_string(), d.cases.to_string()])
        .collect();
    let mut recommendations = String::new();
    for text in &summary.recommendations {
        let _ = write!(recommendations, "<li>{}</li>", escape_html(text));
    }
    format!(
        r#"<section><h2>Conformance</h2><div class="stats">{}</div>{}<ul>{}</ul></section>"#,
        cards.join(""),
        table(&["Deviation", "Cases"], &rows),
        recommendations
    )
}

fn enhanced_sections(data: &LoadedLog) -> String {
    format!(
        r#"{}{}{}
<section><h2>Process Map</h2><p><a href="/process-map">Open the directly-follows graph</a></p></section>
<section><h2>Upload</h2><p>POST a CSV event log (case, activity and timestamp columns) or an XES log to <code>/api/upload</code> to replace the loaded data.</p></section>"#,
        bottleneck_section(data),
        pattern_section(data),
        conformance_section(data)
    )
}

/// Full HTML page of a dashboard.
pub fn render_page(variant: DashboardVariant, port: u16, data: &LoadedLog) -> String {
    let body = if data.is_empty() {
        String::new()
    } else {
        let metrics = ProcessMetrics::compute(&data.log);
        let mut body = metrics_section(&metrics);
        if variant.is_enhanced() {
            body.push_str(&enhanced_sections(data));
        }
        body
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; color: #2c3e50; }}
        h1 {{ border-bottom: 2px solid #2196F3; padding-bottom: 10px; }}
        .port-info {{ background-color: #f0f2f6; padding: 10px; border-left: 5px solid #2196F3; }}
        .alert {{ padding: 10px; margin: 15px 0; border-radius: 5px; }}
        .alert.error {{ background: #fdecea; color: #b71c1c; }}
        .alert.info {{ background: #e3f2fd; }}
        .alert.ok {{ background: #e8f5e9; }}
        .stats {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }}
        .stat {{ border: 1px solid #ecf0f1; border-radius: 5px; padding: 10px; }}
        .stat .value {{ font-size: 1.6em; font-weight: bold; }}
        table {{ border-collapse: collapse; margin: 10px 0; }}
        th, td {{ border: 1px solid #ecf0f1; padding: 4px 10px; text-align: left; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="port-info">Running on port {port}</div>
    {status}
    {body}
</body>
</html>"#,
        title = title(variant),
        status = status_section(data),
    )
}

/// Text rendering of a graph wrapped in a page.
pub fn text_graph_page(text: &str, reason: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Process Map</title></head>
<body>
    <p>Graphviz is unavailable ({}); showing the text rendering.</p>
    <pre>{}</pre>
</body>
</html>"#,
        escape_html(reason),
        escape_html(text)
    )
}
