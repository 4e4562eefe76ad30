use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde_json::json;

use crate::core::constants::artifacts;
use crate::core::error::Result;
use crate::pipeline::AnalysisResults;

/// Constants for index styling and layout
mod index_constants {
    /// Chart.js CDN URL for rendering charts
    pub const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";
    /// Conformance histogram bucket width
    pub const SCORE_BUCKET: f64 = 0.1;
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Overview page linking every artifact of a run.
pub struct HtmlIndex;

impl HtmlIndex {
    /// Generate and write `index.html` into `output_dir`
    pub fn write(results: &AnalysisResults, output_dir: &Path) -> Result<()> {
        let html = Self::generate_html_content(results)?;
        fs::write(output_dir.join(artifacts::INDEX), html)?;
        Ok(())
    }

    pub fn generate_html_content(results: &AnalysisResults) -> Result<String> {
        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Educational Process Mining Analysis Results</title>
    <script src="{}"></script>
    <style>{}</style>
</head>
<body>
    {}
    <script>{}</script>
</body>
</html>"#,
            index_constants::CHART_JS_CDN,
            Self::generate_css(),
            Self::generate_body_content(results)?,
            Self::generate_javascript()
        ))
    }

    fn generate_css() -> &'static str {
        r#"
        body { font-family: Arial, sans-serif; margin: 40px; color: #2c3e50; }
        h1 { color: #2c3e50; }
        h2 { color: #34495e; border-bottom: 2px solid #ecf0f1; padding-bottom: 10px; }
        .section { margin: 20px 0; }
        .summary { background-color: #f8f9fa; padding: 15px; border-radius: 5px; }
        .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }
        .stat { background: #fff; border: 1px solid #ecf0f1; border-radius: 5px; padding: 10px; }
        .stat .value { font-size: 1.6em; font-weight: bold; }
        .file-list { list-style-type: none; padding: 0; }
        .file-list li { margin: 10px 0; }
        .file-list a { text-decoration: none; color: #3498db; }
        .file-list a:hover { text-decoration: underline; }
        .notice { color: #d35400; }
        .charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 20px; }
        footer { margin-top: 50px; padding-top: 20px; border-top: 1px solid #ecf0f1; color: #7f8c8d; }
        "#
    }

    fn generate_body_content(results: &AnalysisResults) -> Result<String> {
        Ok(format!(
            r#"
    <h1>Educational Process Mining Analysis Results</h1>
    <p><strong>Analysis Date:</strong> {}</p>
    {}
    {}
    {}
    {}
    {}
    <footer>
        <p>Generated by epmine {}</p>
    </footer>"#,
            results.generated_at.format("%Y-%m-%d %H:%M:%S"),
            Self::generate_stats_section(results),
            Self::generate_reports_section(results),
            Self::generate_process_map_section(results),
            Self::generate_tables_section(),
            Self::generate_charts_section(results)?,
            env!("CARGO_PKG_VERSION"),
        ))
    }

    fn generate_stat(value: &str, label: &str) -> String {
        format!(
            r#"<div class="stat"><div class="value">{}</div><div>{}</div></div>"#,
            escape_html(value),
            escape_html(label)
        )
    }

    fn generate_stats_section(results: &AnalysisResults) -> String {
        let stats = &results.quality_stats;
        let cards = [
            Self::generate_stat(&stats.total_events.to_string(), "Events analysed"),
            Self::generate_stat(&stats.total_cases.to_string(), "Cases"),
            Self::generate_stat(&stats.total_students.to_string(), "Students"),
            Self::generate_stat(&stats.total_activities.to_string(), "Activity types"),
            Self::generate_stat(
                &results.discovery.variants.total_variants.to_string(),
                "Variants",
            ),
        ];
        format!(
            r#"<div class="summary section">
        <h2>Analysis Summary</h2>
        <p>Dataset: {}</p>
        <div class="stats">{}</div>
    </div>"#,
            escape_html(&results.dataset.display().to_string()),
            cards.join("")
        )
    }

    fn link(href: &str, label: &str) -> String {
        format!(
            r#"<li><a href="{}">{}</a></li>"#,
            escape_html(href),
            escape_html(label)
        )
    }

    fn generate_reports_section(results: &AnalysisResults) -> String {
        let links = [
            Self::link(artifacts::PERFORMANCE_REPORT, "Performance Analysis Report"),
            Self::link(artifacts::CONFORMANCE_REPORT, "Conformance Analysis Report"),
            Self::link(&results.summary_file, "Executive Summary"),
            Self::link(artifacts::RUN_SUMMARY, "Run Summary (JSON)"),
        ];
        format!(
            r#"<div class="section">
        <h2>Generated Reports</h2>
        <ul class="file-list">{}</ul>
    </div>"#,
            links.join("")
        )
    }

    fn generate_process_map_section(results: &AnalysisResults) -> String {
        let mut items = String::new();
        for (title, rendered) in &results.process_maps {
            let file = rendered
                .outcome
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dot = rendered
                .dot_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let notice = if rendered.outcome.is_fallback() {
                r#" <span class="notice">(Graphviz unavailable, text rendering)</span>"#
            } else {
                ""
            };
            let _ = write!(
                items,
                r#"<li><a href="{}">{}</a>{} &middot; <a href="{}">DOT source</a></li>"#,
                escape_html(&file),
                escape_html(title),
                notice,
                escape_html(&dot)
            );
        }
        format!(
            r#"<div class="section">
        <h2>Process Maps</h2>
        <ul class="file-list">{items}</ul>
    </div>"#
        )
    }

    fn generate_tables_section() -> String {
        let links = [
            Self::link(artifacts::ACTIVITY_FREQUENCY, "Activity Frequency"),
            Self::link(artifacts::SESSION_HEATMAP, "Session Activity Heatmap"),
            Self::link(artifacts::CASE_METRICS, "Case Metrics"),
            Self::link(artifacts::CONFORMANCE_SCORES, "Conformance Scores"),
        ];
        format!(
            r#"<div class="section">
        <h2>Data Tables</h2>
        <ul class="file-list">{}</ul>
    </div>"#,
            links.join("")
        )
    }

    /// Conformance score histogram buckets `[0.0, 0.1)` .. `[0.9, 1.0]`
    fn score_histogram(scores: &[f64]) -> Vec<usize> {
        let buckets = (1.0 / index_constants::SCORE_BUCKET).round() as usize;
        let mut counts = vec![0; buckets];
        for score in scores {
            let i = ((score / index_constants::SCORE_BUCKET).floor() as usize).min(buckets - 1);
            counts[i] += 1;
        }
        counts
    }

    fn generate_charts_section(results: &AnalysisResults) -> Result<String> {
        let frequency = &results.discovery.activity_frequency;
        let hourly = &results.performance.patterns.hourly_distribution;
        let overall: Vec<f64> = results.conformance.cases.iter().map(|c| c.overall()).collect();

        let data = json!({
            "activityFrequency": {
                "labels": frequency.iter().map(|(a, _)| a).collect::<Vec<_>>(),
                "values": frequency.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            },
            "hourly": {
                "labels": hourly.iter().map(|(h, _)| format!("{h:02}:00")).collect::<Vec<_>>(),
                "values": hourly.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            },
            "sessions": {
                "labels": results.performance.sessions.iter().map(|s| &s.label).collect::<Vec<_>>(),
                "values": results.performance.sessions.iter().map(|s| s.avg_events).collect::<Vec<_>>(),
            },
            "conformance": {
                "labels": (0..10).map(|i| format!("{:.1}", i as f64 / 10.0)).collect::<Vec<_>>(),
                "values": Self::score_histogram(&overall),
            },
        });
        // Keep `</script>` inside activity names from closing the tag
        let data = serde_json::to_string(&data)?.replace("</", "<\\/");

        Ok(format!(
            r#"<div class="section">
        <h2>Charts</h2>
        <div class="charts">
            <div><h3>Activity Frequency</h3><canvas id="activityChart"></canvas></div>
            <div><h3>Hourly Activity Distribution</h3><canvas id="hourlyChart"></canvas></div>
            <div><h3>Average Events per Session</h3><canvas id="sessionChart"></canvas></div>
            <div><h3>Overall Conformance Distribution</h3><canvas id="conformanceChart"></canvas></div>
        </div>
    </div>
    <script>window.chartData = {data};</script>"#
        ))
    }

    fn generate_javascript() -> &'static str {
        r#"
        document.addEventListener('DOMContentLoaded', function() {
            if (typeof Chart === 'undefined' || !window.chartData) {
                return;
            }
            const charts = [
                ['activityChart', 'activityFrequency', 'Events', '#3498db'],
                ['hourlyChart', 'hourly', 'Events', '#2ecc71'],
                ['sessionChart', 'sessions', 'Average events', '#9b59b6'],
                ['conformanceChart', 'conformance', 'Cases', '#e67e22']
            ];
            for (const [id, key, label, color] of charts) {
                const ctx = document.getElementById(id);
                const series = window.chartData[key];
                if (!ctx || !series) {
                    continue;
                }
                new Chart(ctx, {
                    type: 'bar',
                    data: {
                        labels: series.labels,
                        datasets: [{ label: label, data: series.values, backgroundColor: color }]
                    },
                    options: { responsive: true, plugins: { legend: { display: false } } }
                });
            }
        });
        "#
    }
}
