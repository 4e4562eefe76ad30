//! Process analysis
//!
//! Performance metrics, student clustering, conformance checking and the
//! dashboard interpreters (bottlenecks, patterns, headline metrics).

pub mod bottleneck;
pub mod clustering;
pub mod conformance;
pub mod metrics;
pub mod patterns;
pub mod performance;
pub mod stats;

// Re-export commonly used items
pub use bottleneck::{Bottleneck, BottleneckKind, detect_bottlenecks, format_duration};
pub use clustering::Clustering;
pub use conformance::{
    ConformanceAnalysis, ConformanceSummary, DeviationKind, REFERENCE_MODEL, ReferenceModel,
};
pub use metrics::ProcessMetrics;
pub use patterns::PatternAnalysis;
pub use performance::{CaseMetrics, PerformanceAnalysis};
