use serde::Serialize;
use std::time::{Duration, Instant};
use sysinfo::System;

use crate::ui::color::{Colors, colorize, icon};

/// The number of bytes in a megabyte for memory calculations
const BYTES_PER_MB: f64 = 1_048_576.0;

/// Performance thresholds for generating recommendations
mod thresholds {
    use std::time::Duration;

    pub const HIGH_MEMORY_MB: f64 = 1000.0;
    pub const SLOW_LOADING_EVENTS_PER_SEC: f64 = 10_000.0;
    pub const LONG_STAGE_TIME: Duration = Duration::from_secs(30);
}

/// Result of a single pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StageBenchmark {
    pub stage: String,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub items_processed: usize,
    pub memory_used: u64,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(duration.as_millis() as u64)
}

impl StageBenchmark {
    /// Calculate throughput in items per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_millis() > 0 {
            self.items_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn is_loading(&self) -> bool {
        self.stage.to_lowercase().contains("preprocessing")
    }
}

/// Complete performance analysis report
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    #[serde(serialize_with = "serialize_millis")]
    pub total_duration: Duration,
    pub stages: Vec<StageBenchmark>,
    pub peak_memory_mb: f64,
    pub recommendations: Vec<String>,
}

impl PerformanceReport {
    fn new(total_duration: Duration, stages: Vec<StageBenchmark>, memory_samples: &[u64]) -> Self {
        let peak_memory_mb =
            memory_samples.iter().max().copied().unwrap_or_default() as f64 / BYTES_PER_MB;
        let recommendations = Self::generate_recommendations(&stages, peak_memory_mb);

        Self {
            total_duration,
            stages,
            peak_memory_mb,
            recommendations,
        }
    }

    fn generate_recommendations(stages: &[StageBenchmark], peak_memory_mb: f64) -> Vec<String> {
        let mut recommendations = Vec::new();

        if peak_memory_mb > thresholds::HIGH_MEMORY_MB {
            recommendations.push(
                "High memory usage. Consider raising --min-events to drop short cases earlier"
                    .to_string(),
            );
        }

        for stage in stages {
            if stage.is_loading()
                && stage.items_processed > 0
                && stage.throughput() < thresholds::SLOW_LOADING_EVENTS_PER_SEC
            {
                recommendations.push(
                    "Slow dataset loading. Consider keeping the dataset on local storage"
                        .to_string(),
                );
            }

            if stage.duration > thresholds::LONG_STAGE_TIME {
                recommendations.push(format!(
                    "{} took {:.1}s. Consider --exclude-pattern to remove noisy activities",
                    stage.stage,
                    stage.duration.as_secs_f64()
                ));
            }
        }

        recommendations
    }
}

/// Per-stage timing and memory profiler
pub struct PerformanceProfiler {
    system: System,
    start_time: Instant,
    stages: Vec<StageBenchmark>,
    memory_samples: Vec<u64>,
}

impl PerformanceProfiler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        Self {
            system,
            start_time: Instant::now(),
            stages: Vec::new(),
            memory_samples: Vec::new(),
        }
    }

    /// Start timing a stage
    pub fn start_operation(&mut self, stage: &str) -> OperationTimer {
        self.system.refresh_memory();
        OperationTimer::new(stage)
    }

    /// Finish timing a stage and record the results
    pub fn finish_operation(&mut self, timer: OperationTimer, items_processed: usize) -> Duration {
        let duration = timer.start_time.elapsed();
        let memory_used = self.current_memory();
        self.memory_samples.push(memory_used);

        self.stages.push(StageBenchmark {
            stage: timer.stage,
            duration,
            items_processed,
            memory_used,
        });
        duration
    }

    pub fn generate_report(&self) -> PerformanceReport {
        PerformanceReport::new(
            self.start_time.elapsed(),
            self.stages.clone(),
            &self.memory_samples,
        )
    }

    /// Print a performance summary to stdout
    pub fn display_performance_summary(&self) {
        let report = self.generate_report();

        println!(
            "\n{} {}",
            icon(crate::core::constants::display::CHART_EMOJI, "*"),
            colorize("Performance Summary", Colors::BRIGHT_CYAN)
        );
        println!("   Total Duration: {:?}", report.total_duration);
        println!("   Peak Memory: {:.2} MB", report.peak_memory_mb);

        if !report.stages.is_empty() {
            println!("\n   Stage Breakdown:");
            for stage in &report.stages {
                println!(
                    "   - {}: {:?} ({} items, {} items/sec)",
                    colorize(&stage.stage, Colors::CYAN),
                    stage.duration,
                    stage.items_processed,
                    stage.throughput() as u64
                );
            }
        }

        if !report.recommendations.is_empty() {
            println!("\n   {}", colorize("Recommendations:", Colors::BRIGHT_YELLOW));
            for rec in &report.recommendations {
                println!("   - {rec}");
            }
        }
    }

    /// Resident memory of this process in bytes
    fn current_memory(&mut self) -> u64 {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return 0;
        };
        self.system.refresh_processes(
            sysinfo::ProcessesToUpdate::Some(&[pid]),
            true,
        );
        self.system
            .process(pid)
            .map(|process| process.memory())
            .unwrap_or(0)
    }
}

/// Timer for measuring stage duration
pub struct OperationTimer {
    stage: String,
    start_time: Instant,
}

impl OperationTimer {
    fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            start_time: Instant::now(),
        }
    }
}

impl Default for PerformanceProfiler {
    fn default() -> Self {
        Self::new()
    }
}
