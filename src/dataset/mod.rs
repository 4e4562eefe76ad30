//! Event data loading and preprocessing
//!
//! This module reads EPM dataset directories and CSV or XES event logs into
//! an [`EventLog`], and applies the quality filter used before analysis.

pub mod csv_log;
pub mod event_log;
pub mod loader;
pub mod preprocess;
pub mod xes_log;

use std::path::{Path, PathBuf};

use crate::core::constants::dataset;
use crate::core::error::{EpmError, Result};

// Re-export commonly used items
pub use csv_log::{load_csv_log, parse_csv_log};
pub use event_log::{Case, EventLog};
pub use loader::load_epm_dataset;
pub use preprocess::{BasicStats, QualityFilter, describe_activity};
pub use xes_log::{load_xes_log, parse_xes_log};

/// Text formats an uploaded event log may come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLogFormat {
    Csv,
    Xes,
}

impl EventLogFormat {
    /// XML content types and bodies starting with `<` are XES, anything
    /// else is CSV.
    pub fn detect(content_type: Option<&str>, body: &str) -> Self {
        let xml_type = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("xml"));
        if xml_type || body.trim_start_matches('\u{feff}').trim_start().starts_with('<') {
            EventLogFormat::Xes
        } else {
            EventLogFormat::Csv
        }
    }

    pub fn parse(self, body: &str) -> Result<EventLog> {
        match self {
            EventLogFormat::Csv => parse_csv_log(body),
            EventLogFormat::Xes => parse_xes_log(body),
        }
    }
}

/// Where an event log comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// EPM directory layout
    EpmDirectory(PathBuf),
    /// CSV event log with a header row
    CsvFile(PathBuf),
    /// XES event log
    XesFile(PathBuf),
}

impl DataSource {
    /// Classify a path: directories are EPM datasets, `.xes` files are XES
    /// logs and any other file is a CSV log.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            DataSource::EpmDirectory(path)
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xes"))
        {
            DataSource::XesFile(path)
        } else {
            DataSource::CsvFile(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DataSource::EpmDirectory(path)
            | DataSource::CsvFile(path)
            | DataSource::XesFile(path) => path,
        }
    }

    pub fn load(&self) -> Result<EventLog> {
        match self {
            DataSource::EpmDirectory(path) => load_epm_dataset(path),
            DataSource::CsvFile(path) | DataSource::XesFile(path) if !path.exists() => Err(
                EpmError::Dataset(format!("Event log not found: {}", path.display())),
            ),
            DataSource::CsvFile(path) => load_csv_log(path),
            DataSource::XesFile(path) => load_xes_log(path),
        }
    }
}

/// Pick the dashboard data source.
///
/// Order: explicit path, `EPM_DATA`, the default dataset directory when it
/// exists, then the bundled sample log.
pub fn resolve_dashboard_source(explicit: Option<&str>, env_value: Option<String>) -> DataSource {
    if let Some(path) = explicit {
        return DataSource::from_path(path);
    }
    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return DataSource::from_path(path);
    }
    let default_dataset = Path::new(dataset::DEFAULT_DATASET);
    if default_dataset.is_dir() {
        return DataSource::EpmDirectory(default_dataset.to_path_buf());
    }
    DataSource::CsvFile(PathBuf::from(dataset::SAMPLE_LOG))
}
