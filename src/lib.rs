//! epmine: educational process mining
//!
//! Reads the EPM student activity logs (or any CSV event log), discovers
//! process models, measures performance and conformance against a reference
//! learning process, writes the results as text, CSV, DOT and HTML, and serves
//! them through two local dashboards.

pub mod analysis;
pub mod config;
pub mod core;
pub mod dataset;
pub mod discovery;
pub mod launcher;
pub mod pipeline;
pub mod render;
pub mod reporting;
pub mod server;
pub mod ui;

// Re-export commonly used items
pub use crate::config::{CliConfig, Config};
pub use crate::core::{DashboardVariant, EpmError, Event, Result};
pub use crate::dataset::{DataSource, EventLog};
pub use crate::launcher::{CommandSpawner, LaunchReport, Launcher, ProcessSpawner};
pub use crate::pipeline::{AnalysisResults, Pipeline, PipelineOptions};
