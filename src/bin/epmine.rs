use clap::{CommandFactory, Parser};
use epmine::config::{CliConfig, Config};
use epmine::core::constants::output_formats;
use epmine::core::error::EpmError;
use epmine::launcher::{CommandSpawner, Launcher, default_launch_root};
use epmine::pipeline::{Pipeline, PipelineOptions};
use epmine::reporting::list_artifacts;
use epmine::reporting::logging;
use epmine::server::{self, DashboardOptions};
use epmine::ui::completion::print_completions;
use epmine::ui::output;
use epmine::ui::{Cli, Commands, cli_to_config};

use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(exit_code) = handle_completion_commands(&cli) {
        std::process::exit(exit_code);
    }

    match run_epmine_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Handle completion commands and return exit code if a completion command was processed
pub fn handle_completion_commands(cli: &Cli) -> Option<i32> {
    match cli.command {
        Commands::CompletionGenerate { shell } => {
            let mut app = Cli::command();
            print_completions(shell, &mut app);
            Some(0)
        }
        _ => None,
    }
}

/// Dispatch a parsed command line; extracted from main() for testing
pub async fn run_epmine_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);

    match &cli.command {
        Commands::Launch { root } => run_launch(root.as_deref(), &cli_config),
        Commands::Analyze(_) => run_analyze(&cli_config),
        Commands::Dashboard {
            variant,
            port,
            host,
            data,
            ..
        } => {
            let config = load_and_merge_config(&cli_config)?;
            let settings = setup_output_settings(&cli_config, &config);
            logging::init_logger(settings.verbose, settings.quiet);

            let options = DashboardOptions {
                variant: *variant,
                port: *port,
                host: host.clone(),
                data: data.clone(),
                dot_binary: config.dot_binary().to_string(),
            };
            server::run_dashboard(&options).await?;
            Ok(0)
        }
        Commands::CompletionGenerate { .. } => Ok(0),
    }
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Settings for output formatting and display
pub struct OutputSettings {
    pub quiet: bool,
    pub verbose: bool,
    pub output_format: String,
    pub show_progress: bool,
}

impl OutputSettings {
    /// Stage banners and notices go to the terminal only in text mode
    pub fn should_announce(&self) -> bool {
        !self.quiet && self.output_format == output_formats::TEXT
    }
}

/// Setup output settings based on CLI and config
pub fn setup_output_settings(cli_config: &CliConfig, config: &Config) -> OutputSettings {
    let quiet = cli_config.quiet;
    let verbose = config.verbose.unwrap_or(false);
    let output_format = config
        .output_format
        .as_deref()
        .unwrap_or(output_formats::DEFAULT)
        .to_string();
    let show_progress =
        !quiet && !cli_config.no_progress && output_format == output_formats::TEXT;

    OutputSettings {
        quiet,
        verbose,
        output_format,
        show_progress,
    }
}

/// Run the six-stage analysis pipeline and list what it wrote
pub fn run_analyze(cli_config: &CliConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_and_merge_config(cli_config)?;
    let settings = setup_output_settings(cli_config, &config);
    logging::init_logger(settings.verbose, settings.quiet);

    let options = PipelineOptions {
        announce: settings.should_announce(),
        progress: settings.show_progress,
        show_performance: config.show_performance.unwrap_or(false),
    };
    let results = Pipeline::new(&config, options)
        .run()
        .inspect_err(|e| logging::log_error("Analysis failed", Some(e)))?;

    let artifacts = list_artifacts(&results.output_dir)?;
    output::display_analysis_results(
        &results,
        &artifacts,
        &settings.output_format,
        settings.quiet,
    );
    Ok(0)
}

/// Resolve the directory the dashboards run in
pub fn resolve_launch_root(root: Option<&str>) -> Result<PathBuf, EpmError> {
    let root = match root {
        Some(root) => PathBuf::from(root),
        None => default_launch_root()?,
    };
    if !root.is_dir() {
        return Err(EpmError::InvalidArgument(format!(
            "Launch root '{}' is not a directory",
            root.display()
        )));
    }
    Ok(root)
}

/// Start both dashboards as detached child processes
pub fn run_launch(
    root: Option<&str>,
    cli_config: &CliConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    logging::init_logger(cli_config.verbose, cli_config.quiet);
    let root = resolve_launch_root(root)?;
    let format = cli_config
        .output_format
        .as_deref()
        .unwrap_or(output_formats::DEFAULT);

    let mut launcher = Launcher::new(CommandSpawner::current_exe()?);
    let report = launcher.launch(&root)?;
    output::display_launch_report(&report, format, cli_config.quiet);
    Ok(0)
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)] // Test code for clarity
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_handle_completion_commands_none() {
        let cli = Cli::try_parse_from(["epmine", "analyze"]).unwrap();
        assert_eq!(handle_completion_commands(&cli), None);
    }

    #[test]
    fn test_load_and_merge_config_no_config_flag() {
        let mut cli_config = CliConfig::default();
        cli_config.no_config = true;
        cli_config.min_events_per_case = Some(3);
        let config = load_and_merge_config(&cli_config).unwrap();
        assert_eq!(config.min_events_per_case, Some(3));
        assert_eq!(config.dependency_threshold, Some(0.5));
    }

    #[test]
    fn test_load_and_merge_config_rejects_bad_cli_value() {
        let mut cli_config = CliConfig::default();
        cli_config.no_config = true;
        cli_config.dependency_threshold = Some(1.5);
        assert!(load_and_merge_config(&cli_config).is_err());
    }

    #[test]
    fn test_load_and_merge_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("epmine.toml");
        fs::write(&path, "min_events_per_case = 4\noutput = \"results\"\n").unwrap();

        let mut cli_config = CliConfig::default();
        cli_config.config_file = Some(path.to_string_lossy().into_owned());
        cli_config.output = Some("cli-results".to_string());
        let config = load_and_merge_config(&cli_config).unwrap();
        assert_eq!(config.min_events_per_case, Some(4));
        assert_eq!(config.output.as_deref(), Some("cli-results"));
    }

    #[test]
    fn test_load_and_merge_config_missing_file() {
        let mut cli_config = CliConfig::default();
        cli_config.config_file = Some("/nonexistent/epmine.toml".to_string());
        assert!(load_and_merge_config(&cli_config).is_err());
    }

    #[test]
    fn test_setup_output_settings() {
        let mut cli_config = CliConfig::default();
        let mut config = Config::default();
        let settings = setup_output_settings(&cli_config, &config);
        assert!(settings.show_progress);
        assert!(settings.should_announce());

        config.output_format = Some("json".to_string());
        let settings = setup_output_settings(&cli_config, &config);
        assert!(!settings.show_progress);
        assert!(!settings.should_announce());

        cli_config.quiet = true;
        config.output_format = Some("text".to_string());
        let settings = setup_output_settings(&cli_config, &config);
        assert!(!settings.show_progress);
        assert!(!settings.should_announce());
    }

    #[test]
    fn test_resolve_launch_root() {
        let dir = TempDir::new().unwrap();
        let root = resolve_launch_root(dir.path().to_str()).unwrap();
        assert_eq!(root, dir.path());
        assert!(resolve_launch_root(Some("/nonexistent/epm-root")).is_err());
        assert!(resolve_launch_root(None).is_ok());
    }
}
