//! Executive summary, machine-readable run summary and artifact listing.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::constants::artifacts;
use crate::core::error::Result;
use crate::dataset::BasicStats;
use crate::pipeline::AnalysisResults;
use crate::reporting::performance::PerformanceReport;

/// `executive_summary_<YYYYmmdd_HHMMSS>.txt`
pub fn summary_file_name(at: NaiveDateTime) -> String {
    format!(
        "{}{}.txt",
        artifacts::EXECUTIVE_SUMMARY_PREFIX,
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Group digits in thousands: `12345` becomes `12,345`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Report lines containing any of `markers`, trimmed, in report order.
fn lines_with<'a>(report: &'a str, markers: &[&str]) -> Vec<&'a str> {
    report
        .lines()
        .filter(|line| markers.iter().any(|m| line.contains(m)))
        .map(str::trim)
        .collect()
}

/// Bullet lines of the conformance report's recommendation section.
fn recommendation_lines(report: &str) -> Vec<&str> {
    report
        .lines()
        .skip_while(|line| !line.contains("RECOMMENDATIONS FOR IMPROVEMENT"))
        .skip(1)
        .take_while(|line| !line.starts_with("6."))
        .map(str::trim)
        .filter(|line| line.starts_with('•'))
        .collect()
}

fn section(out: &mut String, title: &str, underline: usize) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(underline));
}

/// Plain-text executive summary of a run.
pub fn executive_summary(results: &AnalysisResults) -> String {
    let banner = "=".repeat(70);
    let stats = &results.basic_stats;
    let mut s = String::new();

    let _ = writeln!(s, "{banner}");
    let _ = writeln!(s, "EDUCATIONAL PROCESS MINING - EXECUTIVE SUMMARY");
    let _ = writeln!(s, "{banner}");
    let _ = writeln!(
        s,
        "Analysis Date: {}",
        results.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(s, "Dataset: {}", results.dataset.display());
    let _ = writeln!(s);

    section(&mut s, "KEY FINDINGS", 20);
    let _ = writeln!(s, "• Analyzed {} engineering students", stats.total_students);
    let _ = writeln!(
        s,
        "• {} learning activities recorded",
        thousands(stats.total_events)
    );
    let _ = writeln!(
        s,
        "• {} different activity types identified",
        stats.total_activities
    );
    let _ = writeln!(s);
    let _ = writeln!(
        s,
        "• {} unique learning paths discovered",
        results.discovery.variants.total_variants
    );
    let _ = writeln!(s, "• Most students follow individualized learning approaches");
    let _ = writeln!(s);

    for line in lines_with(
        &results.performance_report,
        &[
            "Average Session Duration:",
            "Average Events per Session:",
            "Average Activity Diversity:",
        ],
    ) {
        let _ = writeln!(s, "• {line}");
    }
    let _ = writeln!(s);
    for line in lines_with(
        &results.conformance_report,
        &[
            "Average Sequence Conformance:",
            "Average Behavioral Conformance:",
        ],
    ) {
        let _ = writeln!(s, "• {line}");
    }
    let _ = writeln!(s);

    section(&mut s, "MOST COMMON LEARNING ACTIVITIES", 35);
    for (i, (activity, count)) in results
        .performance
        .patterns
        .activity_frequency
        .iter()
        .take(5)
        .enumerate()
    {
        let _ = writeln!(s, "{}. {activity}: {} occurrences", i + 1, thousands(*count));
    }
    let _ = writeln!(s);

    section(&mut s, "LEARNING PATTERN INSIGHTS", 30);
    for insight in [
        "Students primarily use DEEDS simulator for practical exercises",
        "Diagram analysis is heavily used for verification",
        "Text editor usage indicates solution documentation",
        "Aulaweb platform serves as primary navigation hub",
    ] {
        let _ = writeln!(s, "• {insight}");
    }
    let _ = writeln!(s);

    section(&mut s, "PROCESS DEVIATIONS IDENTIFIED", 35);
    let total_cases = results.conformance.cases.len();
    for (kind, count) in results.conformance.deviation_counts() {
        if count > 0 {
            let pct = count as f64 / total_cases as f64 * 100.0;
            let _ = writeln!(s, "• {}: {count} students ({pct:.1}%)", kind.title());
        }
    }
    let _ = writeln!(s);

    section(&mut s, "RECOMMENDATIONS FOR EDUCATIONAL IMPROVEMENT", 50);
    for line in recommendation_lines(&results.conformance_report) {
        let _ = writeln!(s, "{line}");
    }
    for generic in [
        "Consider implementing learning path templates for consistency",
        "Provide real-time feedback on student progress patterns",
        "Develop adaptive learning suggestions based on individual patterns",
    ] {
        let _ = writeln!(s, "• {generic}");
    }
    let _ = writeln!(s);

    section(&mut s, "TECHNICAL ANALYSIS SUMMARY", 35);
    let _ = writeln!(s, "Process Mining Techniques Applied:");
    for technique in [
        "Directly-Follows Graph (DFG) analysis",
        "Heuristics dependency mining",
        "Behavioral pattern analysis",
        "Sequence conformance checking",
        "Performance bottleneck identification",
    ] {
        let _ = writeln!(s, "  → {technique}");
    }
    let _ = writeln!(s);
    let _ = writeln!(s, "Artifacts Generated:");
    for item in [
        "Process flow diagrams",
        "Activity frequency table",
        "Session activity heatmap",
        "Case performance metrics",
        "Conformance scores",
    ] {
        let _ = writeln!(s, "  → {item}");
    }
    let _ = writeln!(s);

    section(&mut s, "CONCLUSION", 15);
    let _ = writeln!(
        s,
        "This analysis reveals significant insights into student learning\n\
         behaviors in digital electronics education. The process mining\n\
         approach identified learning patterns, performance variations,\n\
         and areas for educational process improvement."
    );
    let _ = writeln!(s);
    let _ = write!(s, "{banner}");

    s
}

/// Location and outcome of one rendered process map.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessMapSummary {
    pub name: String,
    pub dot_file: String,
    pub file: String,
    pub rendered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Contents of `analysis_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub dataset: String,
    pub output_dir: String,
    pub basic_stats: BasicStats,
    pub quality_stats: BasicStats,
    pub total_variants: usize,
    pub dfg_edges: usize,
    pub heuristic_dependencies: usize,
    pub students: usize,
    pub avg_session_duration_hours: f64,
    pub avg_events_per_session: f64,
    pub avg_sequence_conformance: f64,
    pub avg_behavioral_conformance: f64,
    pub deviations: Vec<(String, usize)>,
    pub clusters: Option<usize>,
    pub process_maps: Vec<ProcessMapSummary>,
    pub executive_summary: String,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceReport>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl RunSummary {
    pub fn from_results(results: &AnalysisResults, performance: Option<PerformanceReport>) -> Self {
        use crate::analysis::stats::mean;
        use crate::render::RenderOutcome;

        let process_maps = results
            .process_maps
            .iter()
            .map(|(name, rendered)| ProcessMapSummary {
                name: name.clone(),
                dot_file: file_name(&rendered.dot_path),
                file: file_name(rendered.outcome.path()),
                rendered: !rendered.outcome.is_fallback(),
                fallback_reason: match &rendered.outcome {
                    RenderOutcome::TextFallback { reason, .. } => Some(reason.clone()),
                    RenderOutcome::Rendered(_) => None,
                },
            })
            .collect();

        Self {
            generated_at: results.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            dataset: results.dataset.display().to_string(),
            output_dir: results.output_dir.display().to_string(),
            basic_stats: results.basic_stats.clone(),
            quality_stats: results.quality_stats.clone(),
            total_variants: results.discovery.variants.total_variants,
            dfg_edges: results.discovery.dfg.edge_count(),
            heuristic_dependencies: results.discovery.heuristics.dependencies.len(),
            students: results.performance.student_count(),
            avg_session_duration_hours: results.performance.avg_duration_hours(),
            avg_events_per_session: results.performance.avg_events(),
            avg_sequence_conformance: mean(&results.conformance.sequence_scores()),
            avg_behavioral_conformance: mean(&results.conformance.behavioral_scores()),
            deviations: results
                .conformance
                .deviation_counts()
                .into_iter()
                .map(|(kind, n)| (kind.title().to_string(), n))
                .collect(),
            clusters: results.clustering.as_ref().map(|c| c.n_clusters),
            process_maps,
            executive_summary: results.summary_file.clone(),
            warnings: results.warnings.clone(),
            performance,
        }
    }
}

/// A file in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub size: u64,
}

/// `KB` below one MiB, `MB` above, one decimal.
pub fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes < MIB {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    }
}

/// Files of `dir`, sorted by name.
pub fn list_artifacts(dir: &Path) -> Result<Vec<Artifact>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            found.push(Artifact {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
            });
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}
