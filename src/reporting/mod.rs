//! Analysis and reporting
//!
//! This module writes the pipeline artifacts (text reports, CSV tables, the
//! HTML index and the JSON run summary), profiles pipeline stages and holds
//! the structured logging helpers.

pub mod index;
pub mod logging;
pub mod performance;
pub mod summary;
pub mod tables;

// Re-export commonly used items
pub use index::HtmlIndex;
pub use performance::PerformanceProfiler;
pub use summary::{Artifact, RunSummary, executive_summary, format_size, list_artifacts};
