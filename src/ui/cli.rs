// Command-line interface definitions and parsing for epmine

use crate::config::CliConfig;
use crate::core::constants::{output_formats, render_formats};
use crate::core::types::DashboardVariant;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // Output & Verbosity
    /// Suppress progress output
    #[arg(short = 'q', long, global = true, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, global = true, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Disable progress spinners
    #[arg(long, global = true, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", global = true, help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, global = true, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the minimal (port 8501) and enhanced (port 8502) dashboards
    Launch {
        /// Directory the dashboards run in (default: the project directory around the executable)
        #[arg(long, value_name = "DIR")]
        root: Option<String>,
    },
    /// Run the full process mining pipeline over an EPM dataset
    Analyze(AnalyzeArgs),
    /// Serve one dashboard
    Dashboard {
        /// Dashboard variant
        #[arg(long, value_enum)]
        variant: DashboardVariant,

        /// Port to listen on (default: 8501 minimal, 8502 enhanced)
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,

        /// Address to listen on
        #[arg(long, value_name = "ADDR", default_value = "127.0.0.1")]
        host: String,

        /// EPM dataset directory or CSV event log (default: $EPM_DATA)
        #[arg(long, value_name = "PATH")]
        data: Option<String>,

        /// Graphviz executable used for the process map
        #[arg(long, value_name = "PATH")]
        dot: Option<String>,
    },
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    // Input & Output
    /// EPM dataset directory (default: "EPM Dataset 2")
    #[arg(long, value_name = "DIR", help_heading = "Input & Output")]
    pub dataset: Option<String>,

    /// Output directory (default: output)
    #[arg(long, value_name = "DIR", help_heading = "Input & Output")]
    pub output: Option<String>,

    // Filtering
    /// Minimum events per case (default: 10)
    #[arg(long, value_name = "COUNT", help_heading = "Filtering")]
    pub min_events: Option<usize>,

    /// Activities to drop before analysis (default: Blank Other)
    #[arg(long, value_name = "ACTIVITY", num_args = 1.., help_heading = "Filtering")]
    pub exclude: Vec<String>,

    /// Activity patterns to drop (regex)
    #[arg(long, value_name = "REGEX", help_heading = "Filtering")]
    pub exclude_pattern: Vec<String>,

    // Discovery
    /// Heuristics miner dependency threshold (default: 0.5)
    #[arg(long, value_name = "VALUE", help_heading = "Discovery")]
    pub threshold: Option<f64>,

    /// Graphviz executable (default: dot)
    #[arg(long, value_name = "PATH", help_heading = "Discovery")]
    pub dot: Option<String>,

    /// Process map image format
    #[arg(long, value_name = "FORMAT", value_parser = render_formats::ALL, help_heading = "Discovery")]
    pub render_format: Option<String>,

    // Performance Analysis
    /// Show per-stage timing and memory usage
    #[arg(long, help_heading = "Performance Analysis")]
    pub show_performance: bool,
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    let mut cli_config = CliConfig {
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_format: cli.format.clone(),
        no_progress: cli.no_progress,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
        ..Default::default()
    };

    match &cli.command {
        Commands::Analyze(args) => {
            cli_config.dataset = args.dataset.clone();
            cli_config.output = args.output.clone();
            cli_config.min_events_per_case = args.min_events;
            cli_config.exclude_activities = non_empty(&args.exclude);
            cli_config.exclude_patterns = non_empty(&args.exclude_pattern);
            cli_config.dependency_threshold = args.threshold;
            cli_config.dot_binary = args.dot.clone();
            cli_config.render_format = args.render_format.clone();
            cli_config.show_performance = args.show_performance;
        }
        Commands::Dashboard { dot, .. } => {
            cli_config.dot_binary = dot.clone();
        }
        Commands::Launch { .. } | Commands::CompletionGenerate { .. } => {}
    }

    cli_config
}
