//! The `analyze` pipeline: preprocessing, discovery, performance analysis,
//! conformance checking, executive summary and HTML index, in that order.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::analysis::{Clustering, ConformanceAnalysis, PerformanceAnalysis, REFERENCE_MODEL};
use crate::config::Config;
use crate::core::constants::{artifacts, display};
use crate::core::error::{EpmError, Result};
use crate::dataset::{BasicStats, load_epm_dataset};
use crate::discovery::DiscoveryResults;
use crate::render::{GraphvizRenderer, RenderOutcome, RenderedGraph};
use crate::reporting::performance::PerformanceReport;
use crate::reporting::summary::{RunSummary, executive_summary, summary_file_name, thousands};
use crate::reporting::{HtmlIndex, PerformanceProfiler, logging, tables};
use crate::ui::color;
use crate::ui::progress::ProgressReporter;

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct AnalysisResults {
    pub generated_at: NaiveDateTime,
    pub dataset: PathBuf,
    pub output_dir: PathBuf,
    pub basic_stats: BasicStats,
    pub quality_stats: BasicStats,
    pub discovery: DiscoveryResults,
    pub performance: PerformanceAnalysis,
    /// `None` when there were too few cases to cluster
    pub clustering: Option<Clustering>,
    pub conformance: ConformanceAnalysis,
    pub performance_report: String,
    pub conformance_report: String,
    /// `(title, files)` of each process map
    pub process_maps: Vec<(String, RenderedGraph)>,
    /// Executive summary file name
    pub summary_file: String,
    /// Non-fatal problems, also logged
    pub warnings: Vec<String>,
}

/// How much the pipeline prints while running.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Print the banner and numbered stage lines
    pub announce: bool,
    /// Show spinners while stages run
    pub progress: bool,
    /// Print the profiler summary and store it in the run summary
    pub show_performance: bool,
}

/// One pipeline run bound to a configuration.
pub struct Pipeline<'a> {
    config: &'a Config,
    options: PipelineOptions,
    progress: ProgressReporter,
    profiler: PerformanceProfiler,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, options: PipelineOptions) -> Self {
        Self {
            config,
            options,
            progress: ProgressReporter::new(options.progress),
            profiler: PerformanceProfiler::new(),
        }
    }

    fn say(&self, line: &str) {
        if self.options.announce {
            self.progress.println(line);
        }
    }

    fn stage(&self, number: usize, title: &str) {
        self.say("");
        self.say(&color::stage_header(number, title));
    }

    fn warn(&self, warnings: &mut Vec<String>, message: String) {
        logging::log_warning(&message);
        self.say(&color::warning(&message));
        warnings.push(message);
    }

    fn write_artifact(dir: &Path, name: &str, content: &str) -> Result<()> {
        fs::write(dir.join(name), content)?;
        Ok(())
    }

    /// Execute all stages and write every artifact into the output directory.
    pub fn run(mut self) -> Result<AnalysisResults> {
        let dataset = PathBuf::from(self.config.dataset_path());
        let output_dir = PathBuf::from(self.config.output_dir());
        let generated_at = chrono::Local::now().naive_local();
        let mut warnings = Vec::new();

        fs::create_dir_all(&output_dir).map_err(|e| {
            EpmError::Io(std::io::Error::new(
                e.kind(),
                format!("could not create '{}': {e}", output_dir.display()),
            ))
        })?;
        logging::log_config_info(self.config);

        self.say(&color::rule());
        self.say("EDUCATIONAL PROCESS MINING ANALYSIS");
        self.say(&color::rule());
        self.say(&format!("Starting analysis at {}", generated_at.format("%Y-%m-%d %H:%M:%S")));
        self.say(&format!("Dataset: {}", dataset.display()));
        self.say(&format!("Output directory: {}", output_dir.display()));

        // Stage 1
        self.stage(1, "Data extraction and preprocessing");
        let timer = self.profiler.start_operation("Preprocessing");
        let spinner = self.progress.create_spinner("Loading EPM dataset");
        let loaded = load_epm_dataset(&dataset);
        self.progress.finish_spinner(spinner);
        let event_log = loaded?;
        let basic_stats = BasicStats::compute(&event_log);
        self.say(&color::success(&format!(
            "Loaded {} events from {} cases",
            thousands(basic_stats.total_events),
            basic_stats.total_cases
        )));
        self.say(&color::success(&format!(
            "{} students across {} sessions",
            basic_stats.total_students, basic_stats.total_sessions
        )));

        let quality_log = self.config.quality_filter()?.apply(&event_log);
        let quality_stats = BasicStats::compute(&quality_log);
        self.say(&color::success(&format!(
            "Quality filtered to {} events from {} cases",
            thousands(quality_stats.total_events),
            quality_stats.total_cases
        )));
        if quality_log.is_empty() {
            self.warn(
                &mut warnings,
                "No cases left after quality filtering; reports will be empty".to_string(),
            );
        }
        let elapsed = self.profiler.finish_operation(timer, event_log.len());
        logging::log_stage_complete("Preprocessing", event_log.len(), elapsed);

        // Stage 2
        self.stage(2, "Process discovery");
        let timer = self.profiler.start_operation("Discovery");
        let spinner = self.progress.create_spinner("Discovering process models");
        let discovery = DiscoveryResults::discover(&quality_log, &self.config.discovery_options());
        self.progress.finish_spinner(spinner);

        Self::write_artifact(
            &output_dir,
            artifacts::ACTIVITY_FREQUENCY,
            &tables::activity_frequency_csv(&discovery.activity_frequency)?,
        )?;
        Self::write_artifact(
            &output_dir,
            artifacts::SESSION_HEATMAP,
            &tables::session_heatmap_csv(&discovery.session_matrix)?,
        )?;

        let renderer = GraphvizRenderer::new(self.config.dot_binary(), self.config.render_format());
        let mut process_maps = Vec::new();
        for (title, graph, stem) in [
            ("Directly-Follows Graph", discovery.dfg.to_digraph(), artifacts::DFG_STEM),
            (
                "Heuristics Net",
                discovery.heuristics.to_digraph(),
                artifacts::HEURISTICS_STEM,
            ),
        ] {
            let spinner = self.progress.create_spinner(&format!("Rendering {title}"));
            let rendered = renderer.write_graph(&graph, &output_dir, stem);
            self.progress.finish_spinner(spinner);
            let rendered = rendered?;
            match &rendered.outcome {
                RenderOutcome::Rendered(path) => {
                    self.say(&color::success(&format!("{title} rendered to {}", path.display())))
                }
                RenderOutcome::TextFallback { path, reason } => self.warn(
                    &mut warnings,
                    format!(
                        "{title} not rendered ({reason}); text version written to {}",
                        path.display()
                    ),
                ),
            }
            process_maps.push((title.to_string(), rendered));
        }
        self.say(&color::success(&format!(
            "Process models discovered: {} directly-follows edges, {} dependencies, {} variants",
            discovery.dfg.edge_count(),
            discovery.heuristics.dependencies.len(),
            discovery.variants.total_variants
        )));
        let elapsed = self
            .profiler
            .finish_operation(timer, discovery.dfg.edge_count());
        logging::log_stage_complete("Discovery", discovery.dfg.edge_count(), elapsed);

        // Stage 3
        self.stage(3, "Performance analysis");
        let timer = self.profiler.start_operation("Performance analysis");
        let spinner = self.progress.create_spinner("Computing case metrics");
        let performance = PerformanceAnalysis::run(&quality_log);
        let clustering = Clustering::compute(&performance.metrics);
        self.progress.finish_spinner(spinner);

        let clustering = match clustering {
            Ok(clustering) => {
                self.say(&color::success(&format!(
                    "Students grouped into {} clusters",
                    clustering.n_clusters
                )));
                Some(clustering)
            }
            Err(e) => {
                self.warn(&mut warnings, format!("Clustering skipped: {e}"));
                None
            }
        };
        let performance_report = performance.report();
        Self::write_artifact(&output_dir, artifacts::PERFORMANCE_REPORT, &performance_report)?;
        Self::write_artifact(
            &output_dir,
            artifacts::CASE_METRICS,
            &tables::case_metrics_csv(&performance.metrics)?,
        )?;
        self.say(&color::success("Performance analysis completed"));
        let elapsed = self
            .profiler
            .finish_operation(timer, performance.metrics.len());
        logging::log_stage_complete("Performance analysis", performance.metrics.len(), elapsed);

        // Stage 4
        self.stage(4, "Conformance checking");
        let timer = self.profiler.start_operation("Conformance checking");
        let spinner = self.progress.create_spinner("Checking against the reference model");
        let conformance = ConformanceAnalysis::run(&quality_log);
        self.progress.finish_spinner(spinner);
        let conformance_report = conformance.report(&REFERENCE_MODEL);
        Self::write_artifact(&output_dir, artifacts::CONFORMANCE_REPORT, &conformance_report)?;
        Self::write_artifact(
            &output_dir,
            artifacts::CONFORMANCE_SCORES,
            &tables::conformance_scores_csv(&conformance)?,
        )?;
        self.say(&color::success("Conformance analysis completed"));
        let elapsed = self
            .profiler
            .finish_operation(timer, conformance.cases.len());
        logging::log_stage_complete("Conformance checking", conformance.cases.len(), elapsed);

        let mut results = AnalysisResults {
            generated_at,
            dataset,
            output_dir,
            basic_stats,
            quality_stats,
            discovery,
            performance,
            clustering,
            conformance,
            performance_report,
            conformance_report,
            process_maps,
            summary_file: summary_file_name(generated_at),
            warnings,
        };

        // Stage 5
        self.stage(5, "Generating summary report");
        let timer = self.profiler.start_operation("Summary");
        let summary = executive_summary(&results);
        Self::write_artifact(&results.output_dir, &results.summary_file, &summary)?;
        self.say(&color::success(&format!(
            "Executive summary saved to {}",
            results.output_dir.join(&results.summary_file).display()
        )));
        self.profiler.finish_operation(timer, 1);

        // Stage 6
        self.stage(6, "Building analysis index");
        let timer = self.profiler.start_operation("Index");
        if let Err(e) = HtmlIndex::write(&results, &results.output_dir) {
            let message = format!("Could not write {}: {e}", artifacts::INDEX);
            self.warn(&mut results.warnings, message);
        } else {
            self.say(&color::success(&format!(
                "Analysis index created: {}",
                results.output_dir.join(artifacts::INDEX).display()
            )));
        }
        self.profiler.finish_operation(timer, 1);

        let performance_report = self
            .options
            .show_performance
            .then(|| self.profiler.generate_report());
        self.write_run_summary(&results, performance_report)?;
        self.progress.finish_and_clear();

        if self.options.show_performance && self.options.announce {
            self.profiler.display_performance_summary();
        }

        Ok(results)
    }

    fn write_run_summary(
        &self,
        results: &AnalysisResults,
        performance: Option<PerformanceReport>,
    ) -> Result<()> {
        let summary = RunSummary::from_results(results, performance);
        let json = serde_json::to_string_pretty(&summary)?;
        Self::write_artifact(&results.output_dir, artifacts::RUN_SUMMARY, &json)
    }
}

/// Final banner printed after a successful run.
pub fn completion_banner(output_dir: &Path) -> Vec<String> {
    vec![
        String::new(),
        color::rule(),
        format!(
            "{} ANALYSIS COMPLETE",
            color::icon(display::ROCKET_EMOJI, "")
        )
        .trim()
        .to_string(),
        color::rule(),
        format!("All outputs saved to: {}", output_dir.display()),
    ]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;
    use std::path::Path;

    /// Write a small EPM-layout dataset: three students over two sessions.
    pub fn write_epm_dataset(root: &Path) {
        let activities = [
            "Study_Es_1_1",
            "Deeds_Es_1_1",
            "TextEditor_Es_1_1",
            "Study_Es_1_2",
            "Deeds_Es_1_2",
            "Deeds_Es_1_2",
            "Diagram",
            "Aulaweb",
            "TextEditor_Es_1_2",
            "Blank",
            "Deeds_Es_1_3",
            "Study_Es_1_3",
        ];
        for session in 1..=2 {
            let dir = root.join("Data/Processes").join(format!("Session {session}"));
            fs::create_dir_all(&dir).unwrap();
            for student in 1..=3 {
                let mut rows = String::new();
                for (i, activity) in activities.iter().enumerate() {
                    let minute = i + student;
                    rows.push_str(&format!(
                        "{session}, {student}, Es_1_1, {activity}, 2.10.2014 11:{:02}:00, 2.10.2014 11:{:02}:30, 100, 0, 0, 3, 0, 40, 5\n",
                        minute, minute
                    ));
                }
                fs::write(dir.join(student.to_string()), rows).unwrap();
            }
        }
    }
}
