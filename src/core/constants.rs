/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes the literal values shared by the pipeline, the
/// dashboards and the launcher.
/// Output format constants
pub mod output_formats {
    /// Text output format - colorful, emoji-enhanced output
    pub const TEXT: &str = "text";
    /// JSON output format - structured output for automation
    pub const JSON: &str = "json";
    /// Minimal output format - plain text without colors or emojis
    pub const MINIMAL: &str = "minimal";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TEXT, JSON, MINIMAL];
}

/// Graphviz output formats accepted for rendered process maps
pub mod render_formats {
    pub const PNG: &str = "png";
    pub const SVG: &str = "svg";
    pub const PDF: &str = "pdf";

    pub const DEFAULT: &str = PNG;

    pub const ALL: [&str; 3] = [PNG, SVG, PDF];
}

/// Fixed dashboard ports
pub mod ports {
    /// Port of the minimal dashboard
    pub const MINIMAL: u16 = 8501;
    /// Port of the enhanced dashboard
    pub const ENHANCED: u16 = 8502;
}

/// Dashboard server limits
pub mod server {
    /// Largest accepted upload body
    pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
}

/// EPM dataset layout
pub mod dataset {
    /// Dataset directory used when none is given
    pub const DEFAULT_DATASET: &str = "EPM Dataset 2";
    /// Bundled sample log used by the dashboards as a last resort
    pub const SAMPLE_LOG: &str = "data/epm_sample.csv";
    /// Sub-directory holding the per-session folders
    pub const PROCESSES_DIR: &str = "Data/Processes";
    /// Number of lab sessions
    pub const SESSION_COUNT: u32 = 6;
    /// Number of columns in a student log row
    pub const COLUMN_COUNT: usize = 13;
    /// Timestamp format of the raw logs
    pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
    /// Environment variable consulted by the dashboards
    pub const DATA_ENV_VAR: &str = "EPM_DATA";
}

/// Default analysis parameters
pub mod defaults {
    /// Output directory used when none is given
    pub const OUTPUT_DIR: &str = "output";
    /// Minimum number of events a case needs to survive filtering
    pub const MIN_EVENTS_PER_CASE: usize = 10;
    /// Activities removed before analysis
    pub const EXCLUDED_ACTIVITIES: [&str; 2] = ["Blank", "Other"];
    /// Heuristics miner dependency threshold
    pub const DEPENDENCY_THRESHOLD: f64 = 0.5;
    /// Number of variants listed in the top-variant table
    pub const TOP_VARIANTS: usize = 10;
    /// Number of variants kept in the distribution chart
    pub const VARIANT_DISTRIBUTION: usize = 20;
    /// Number of activities in the frequency table
    pub const TOP_ACTIVITIES: usize = 20;
    /// Number of activities in the session heatmap
    pub const HEATMAP_ACTIVITIES: usize = 15;
    /// Number of transitions in the pattern summary
    pub const TOP_TRANSITIONS: usize = 20;
    /// Upper bound on student clusters
    pub const MAX_CLUSTERS: usize = 5;
    /// Graphviz executable name
    pub const DOT_BINARY: &str = "dot";
}

/// Limits on the dashboard panels
pub mod panels {
    pub const TOP_BOTTLENECKS: usize = 5;
    pub const TOP_VARIANTS: usize = 5;
    pub const TOP_BIGRAMS: usize = 10;
    /// Trace length deviation (from the median) that marks an anomaly
    pub const ANOMALY_LENGTH_DELTA: usize = 3;
}

/// Names of files written by the pipeline
pub mod artifacts {
    pub const DFG_STEM: &str = "educational_process_dfg";
    pub const HEURISTICS_STEM: &str = "heuristics_net";
    pub const ACTIVITY_FREQUENCY: &str = "activity_frequency.csv";
    pub const SESSION_HEATMAP: &str = "session_activity_heatmap.csv";
    pub const CASE_METRICS: &str = "case_metrics.csv";
    pub const PERFORMANCE_REPORT: &str = "performance_analysis_report.txt";
    pub const CONFORMANCE_REPORT: &str = "conformance_analysis_report.txt";
    pub const CONFORMANCE_SCORES: &str = "conformance_scores.csv";
    pub const EXECUTIVE_SUMMARY_PREFIX: &str = "executive_summary_";
    pub const RUN_SUMMARY: &str = "analysis_summary.json";
    pub const INDEX: &str = "index.html";
}

/// Configuration file lookup
pub mod config_files {
    /// File name searched in the current and parent directories
    pub const FILE_NAME: &str = ".epmine.toml";
    /// Number of parent directories searched
    pub const PARENT_LEVELS: usize = 3;
}

/// Display and formatting constants
pub mod display {
    pub const SUCCESS_EMOJI: &str = "✅";
    pub const WARNING_EMOJI: &str = "⚠️";
    pub const ERROR_EMOJI: &str = "❌";
    pub const STAGE_EMOJI: &str = "🔄";
    pub const CHART_EMOJI: &str = "📊";
    pub const FILE_EMOJI: &str = "📁";
    pub const ROCKET_EMOJI: &str = "🚀";
    /// Width of the `=` banner lines in reports
    pub const BANNER_WIDTH: usize = 60;
}
