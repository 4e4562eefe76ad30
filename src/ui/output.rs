//! Output formatting and display logic for epmine

use serde_json::{Value, json};

use crate::core::constants::{artifacts, display, output_formats};
use crate::launcher::LaunchReport;
use crate::pipeline::{AnalysisResults, completion_banner};
use crate::reporting::summary::{Artifact, RunSummary, format_size};
use crate::ui::color::{Colors, colorize, icon, warning};

/// Lines listing the generated files with their sizes
pub fn artifact_lines(artifacts: &[Artifact]) -> Vec<String> {
    artifacts
        .iter()
        .map(|a| format!("  • {} ({})", a.name, format_size(a.size)))
        .collect()
}

/// JSON document printed for `--format json`.
///
/// The stored run summary is used when readable so the profiler section is
/// included.
pub fn analysis_json(results: &AnalysisResults, artifacts: &[Artifact]) -> Value {
    let summary = std::fs::read_to_string(results.output_dir.join(artifacts::RUN_SUMMARY))
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(&text).ok())
        .unwrap_or_else(|| json!(RunSummary::from_results(results, None)));
    json!({
        "summary": summary,
        "artifacts": artifacts,
    })
}

/// Print the outcome of an `analyze` run in the requested format
pub fn display_analysis_results(
    results: &AnalysisResults,
    artifacts: &[Artifact],
    format: &str,
    quiet: bool,
) {
    match format {
        output_formats::JSON => {
            let document = analysis_json(results, artifacts);
            match serde_json::to_string_pretty(&document) {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("Error: could not serialize results: {e}"),
            }
        }
        output_formats::MINIMAL => {
            for artifact in artifacts {
                println!("{}\t{}", artifact.name, format_size(artifact.size));
            }
            for message in &results.warnings {
                eprintln!("warning: {message}");
            }
        }
        _ => {
            if quiet {
                return;
            }
            for line in completion_banner(&results.output_dir) {
                println!("{line}");
            }
            println!();
            println!(
                "{}",
                colorize(
                    &format!(
                        "{} Generated files:",
                        icon(display::FILE_EMOJI, "")
                    )
                    .trim_start()
                    .to_string(),
                    Colors::BRIGHT_CYAN
                )
            );
            for line in artifact_lines(artifacts) {
                println!("{line}");
            }
            if !results.warnings.is_empty() {
                println!();
                println!(
                    "{}",
                    warning(&format!(
                        "{} visualization warning(s), see the run summary",
                        results.warnings.len()
                    ))
                );
            }
        }
    }
}

/// Lines describing started dashboards
pub fn launch_lines(report: &LaunchReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} Starting dashboards:", icon(display::ROCKET_EMOJI, ""))
            .trim_start()
            .to_string(),
    ];
    for child in &report.children {
        lines.push(format!(
            "  {:<9} {} (pid {})",
            child.variant.name(),
            child.url(),
            child.pid
        ));
    }
    lines.push("Each dashboard runs until it is stopped; close them individually.".to_string());
    lines
}

/// Print a launch report in the requested format
pub fn display_launch_report(report: &LaunchReport, format: &str, quiet: bool) {
    match format {
        output_formats::JSON => match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("Error: could not serialize launch report: {e}"),
        },
        output_formats::MINIMAL => {
            for child in &report.children {
                println!("{}\t{}\t{}", child.variant.name(), child.port, child.pid);
            }
        }
        _ if quiet => {}
        _ => {
            for line in launch_lines(report) {
                println!("{line}");
            }
        }
    }
}
