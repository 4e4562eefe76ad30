use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Spinners shown while pipeline stages run.
pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::new()),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a spinner for an indeterminate stage step
    pub fn create_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    /// Stop a spinner and leave no trace of it
    pub fn finish_spinner(&self, spinner: Option<ProgressBar>) {
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
    }

    /// Print above active spinners. A hidden draw target (no terminal)
    /// would swallow the line, so that case goes straight to stdout.
    pub fn println(&self, message: &str) {
        if self.enabled && !self.multi_progress.is_hidden() {
            self.multi_progress.println(message).unwrap_or(());
        } else {
            println!("{message}");
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_creates_no_spinner() {
        let reporter = ProgressReporter::new(false);
        assert!(!reporter.is_enabled());
        assert!(reporter.create_spinner("Loading").is_none());
        reporter.finish_spinner(None);
        reporter.finish_and_clear();
    }

    #[test]
    fn test_enabled_reporter_spinner_lifecycle() {
        let reporter = ProgressReporter::new(true);
        let spinner = reporter.create_spinner("Discovering process models");
        assert!(spinner.is_some());
        if let Some(ref pb) = spinner {
            assert_eq!(pb.message(), "Discovering process models");
        }
        reporter.finish_spinner(spinner);
        reporter.finish_and_clear();
    }
}
