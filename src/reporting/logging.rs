use crate::config::Config;
use log::{debug, error, info, warn};
use std::path::Path;
use std::time::Duration;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    // A second init (tests, embedded use) keeps the first logger
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    info!(
        "Configuration: dataset={}, output={}",
        config.dataset_path(),
        config.output_dir()
    );
    info!(
        "Filtering: min_events={}, exclude={:?}, patterns={:?}",
        config.min_events_per_case.unwrap_or_default(),
        config.excluded_activities(),
        config.exclude_patterns.as_deref().unwrap_or_default()
    );
    info!(
        "Discovery: threshold={}, dot={}, format={}",
        config.dependency_threshold.unwrap_or_default(),
        config.dot_binary(),
        config.render_format()
    );
}

/// Log one scanned session folder
pub fn log_session_scan(session: u32, files: usize) {
    debug!("Session {session}: {files} student file(s)");
}

/// Log a student file that could not be read
pub fn log_unreadable_file(path: &Path, err: &std::io::Error) {
    warn!("Skipping unreadable file {}: {err}", path.display());
}

/// Log the outcome of a dataset scan
pub fn log_dataset_loaded(records: usize, files: usize) {
    info!("Loaded {records} record(s) from {files} student file(s)");
}

/// Log a finished pipeline stage
pub fn log_stage_complete(stage: &str, items: usize, duration: Duration) {
    info!(
        "{stage} complete: {items} item(s) in {}ms",
        duration.as_millis()
    );
}

/// Log a graph that was written as text instead of an image
pub fn log_render_fallback(stem: &str, reason: &dyn std::error::Error) {
    warn!("Could not render {stem} with Graphviz, wrote text fallback: {reason}");
}

/// Log a dashboard request for debugging
pub fn log_request(variant: &str, path: &str) {
    debug!("[{variant}] GET {path}");
}

/// Log a dashboard child process started by the launcher
pub fn log_dashboard_spawned(variant: &str, port: u16, pid: u32) {
    info!("Started {variant} dashboard on port {port} (pid {pid})");
}

/// Log the data source a dashboard loaded
pub fn log_dashboard_data(variant: &str, source: &Path, events: usize) {
    info!("[{variant}] Loaded {events} event(s) from {}", source.display());
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}
