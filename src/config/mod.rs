//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::constants::{config_files, defaults, output_formats, render_formats};
use crate::core::error::{EpmError, Result};
use crate::dataset::QualityFilter;
use crate::discovery::DiscoveryOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// EPM dataset directory
    pub dataset: Option<String>,

    /// Directory receiving the analysis artifacts
    pub output: Option<String>,

    /// Cases with fewer events are dropped
    pub min_events_per_case: Option<usize>,

    /// Activity names removed before analysis
    pub exclude_activities: Option<Vec<String>>,

    /// Activity name patterns removed before analysis (regex)
    pub exclude_patterns: Option<Vec<String>>,

    /// Heuristics miner dependency threshold (0-1)
    pub dependency_threshold: Option<f64>,

    /// Number of variants listed in the top-variant table
    pub top_variants: Option<usize>,

    /// Graphviz executable name or path
    pub dot_binary: Option<String>,

    /// Image format for rendered process maps (png, svg, pdf)
    pub render_format: Option<String>,

    /// Output format (text, json, minimal)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Show stage timings and memory usage
    pub show_performance: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            output: None,
            min_events_per_case: Some(defaults::MIN_EVENTS_PER_CASE),
            exclude_activities: None,
            exclude_patterns: None,
            dependency_threshold: Some(defaults::DEPENDENCY_THRESHOLD),
            top_variants: Some(defaults::TOP_VARIANTS),
            dot_binary: None,
            render_format: Some(render_formats::DEFAULT.to_string()),
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
            show_performance: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EpmError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            EpmError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(config_files::FILE_NAME) {
            return config;
        }

        for i in 1..=config_files::PARENT_LEVELS {
            let path = format!("{}{}", "../".repeat(i), config_files::FILE_NAME);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Inputs & outputs
        if let Some(ref dataset) = cli_config.dataset {
            self.dataset = Some(dataset.clone());
        }
        if let Some(ref output) = cli_config.output {
            self.output = Some(output.clone());
        }

        // Filtering
        if let Some(min_events) = cli_config.min_events_per_case {
            self.min_events_per_case = Some(min_events);
        }
        if let Some(ref exclude) = cli_config.exclude_activities {
            self.exclude_activities = Some(exclude.clone());
        }
        if let Some(ref patterns) = cli_config.exclude_patterns {
            self.exclude_patterns = Some(patterns.clone());
        }

        // Discovery & rendering
        if let Some(threshold) = cli_config.dependency_threshold {
            self.dependency_threshold = Some(threshold);
        }
        if let Some(ref dot_binary) = cli_config.dot_binary {
            self.dot_binary = Some(dot_binary.clone());
        }
        if let Some(ref render_format) = cli_config.render_format {
            self.render_format = Some(render_format.clone());
        }

        // Output & format
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if cli_config.show_performance {
            self.show_performance = Some(true);
        }
    }

    /// Compile exclude patterns into regex objects
    pub fn compile_exclude_patterns(&self) -> Result<Vec<Regex>> {
        let mut compiled = Vec::new();
        if let Some(ref patterns) = self.exclude_patterns {
            for pattern in patterns {
                compiled.push(Regex::new(pattern)?);
            }
        }
        Ok(compiled)
    }

    pub fn dataset_path(&self) -> &str {
        self.dataset
            .as_deref()
            .unwrap_or(crate::core::constants::dataset::DEFAULT_DATASET)
    }

    pub fn output_dir(&self) -> &str {
        self.output.as_deref().unwrap_or(defaults::OUTPUT_DIR)
    }

    pub fn excluded_activities(&self) -> Vec<String> {
        match self.exclude_activities {
            Some(ref activities) => activities.clone(),
            None => defaults::EXCLUDED_ACTIVITIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn dot_binary(&self) -> &str {
        self.dot_binary.as_deref().unwrap_or(defaults::DOT_BINARY)
    }

    pub fn render_format(&self) -> &str {
        self.render_format
            .as_deref()
            .unwrap_or(render_formats::DEFAULT)
    }

    /// Quality filter described by this configuration
    pub fn quality_filter(&self) -> Result<QualityFilter> {
        Ok(QualityFilter {
            exclude_activities: self.excluded_activities(),
            exclude_patterns: self.compile_exclude_patterns()?,
            min_events_per_case: self
                .min_events_per_case
                .unwrap_or(defaults::MIN_EVENTS_PER_CASE),
        })
    }

    /// Discovery parameters described by this configuration
    pub fn discovery_options(&self) -> DiscoveryOptions {
        let base = DiscoveryOptions::default();
        DiscoveryOptions {
            dependency_threshold: self
                .dependency_threshold
                .unwrap_or(base.dependency_threshold),
            top_variants: self.top_variants.unwrap_or(base.top_variants),
            ..base
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(min_events) = self.min_events_per_case
            && min_events == 0
        {
            return Err(EpmError::Config(
                "Minimum events per case cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(threshold) = self.dependency_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(EpmError::Config(format!(
                "Dependency threshold {threshold} is invalid. Expected a value between 0 and 1."
            )));
        }

        if let Some(top) = self.top_variants
            && top == 0
        {
            return Err(EpmError::Config(
                "Top variants cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(EpmError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        if let Some(ref format) = self.render_format
            && !render_formats::ALL.contains(&format.as_str())
        {
            return Err(EpmError::Config(format!(
                "Invalid render format '{format}'. Expected one of: {}.",
                render_formats::ALL.join(", ")
            )));
        }

        if let Some(ref binary) = self.dot_binary
            && binary.trim().is_empty()
        {
            return Err(EpmError::Config(
                "Graphviz binary cannot be empty.".to_string(),
            ));
        }

        self.compile_exclude_patterns()?;

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Inputs & outputs
    pub dataset: Option<String>, // --dataset
    pub output: Option<String>,  // --output

    // Filtering
    pub min_events_per_case: Option<usize>,     // --min-events
    pub exclude_activities: Option<Vec<String>>, // --exclude
    pub exclude_patterns: Option<Vec<String>>,  // --exclude-pattern

    // Discovery & rendering
    pub dependency_threshold: Option<f64>, // --threshold
    pub dot_binary: Option<String>,        // --dot
    pub render_format: Option<String>,     // --render-format

    // Output & format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config

    // Performance Analysis
    pub show_performance: bool, // --show-performance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(
            config.min_events_per_case,
            Some(defaults::MIN_EVENTS_PER_CASE)
        );
        assert_eq!(config.dependency_threshold, Some(0.5));
        assert_eq!(config.output_format, Some(output_formats::DEFAULT.to_string()));
        assert_eq!(config.render_format, Some("png".to_string()));
        assert_eq!(config.dataset_path(), "EPM Dataset 2");
        assert_eq!(config.output_dir(), "output");
        assert_eq!(config.dot_binary(), "dot");
        assert_eq!(config.excluded_activities(), vec!["Blank", "Other"]);
    }

    #[test]
    fn test_config_load_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            b"dataset = \"/data/epm\"\nmin_events_per_case = 5\nexclude_activities = [\"Blank\"]\nrender_format = \"svg\"",
        )?;

        let config = Config::load_from_file(file.path())?;
        assert_eq!(config.dataset_path(), "/data/epm");
        assert_eq!(config.min_events_per_case, Some(5));
        assert_eq!(config.excluded_activities(), vec!["Blank"]);
        assert_eq!(config.render_format(), "svg");
        // Fields absent from the file stay unset
        assert_eq!(config.dependency_threshold, None);

        Ok(())
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"min_events_per_case = \"ten\"").unwrap();

        match Config::load_from_file(file.path()) {
            Err(EpmError::Config(msg)) => assert!(msg.contains("Invalid TOML")),
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_load_missing_file() {
        let result = Config::load_from_file("/definitely/not/here/.epmine.toml");
        assert!(matches!(result, Err(EpmError::Config(_))));
    }

    #[test]
    fn test_config_merge_with_cli() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            dataset: Some("other".to_string()),
            min_events_per_case: Some(3),
            exclude_activities: Some(vec![]),
            verbose: true,
            show_performance: true,
            ..Default::default()
        };

        config.merge_with_cli(&cli_config);

        assert_eq!(config.dataset_path(), "other");
        assert_eq!(config.min_events_per_case, Some(3));
        assert!(config.excluded_activities().is_empty());
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.show_performance, Some(true));
        // Untouched values survive
        assert_eq!(config.dependency_threshold, Some(0.5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            Config {
                min_events_per_case: Some(0),
                ..Default::default()
            },
            Config {
                dependency_threshold: Some(1.5),
                ..Default::default()
            },
            Config {
                output_format: Some("xml".to_string()),
                ..Default::default()
            },
            Config {
                render_format: Some("gif".to_string()),
                ..Default::default()
            },
            Config {
                exclude_patterns: Some(vec!["[invalid".to_string()]),
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be invalid");
        }
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_quality_filter_from_config() -> Result<()> {
        let config = Config {
            exclude_patterns: Some(vec!["^Text".to_string()]),
            min_events_per_case: Some(2),
            ..Default::default()
        };

        let filter = config.quality_filter()?;
        assert_eq!(filter.min_events_per_case, 2);
        assert_eq!(filter.exclude_activities, vec!["Blank", "Other"]);
        assert!(filter.exclude_patterns[0].is_match("TextEditor_es_1"));
        Ok(())
    }

    #[test]
    fn test_discovery_options_from_config() {
        let config = Config {
            dependency_threshold: Some(0.8),
            top_variants: Some(3),
            ..Default::default()
        };
        let options = config.discovery_options();
        assert_eq!(options.dependency_threshold, 0.8);
        assert_eq!(options.top_variants, 3);
    }
}
