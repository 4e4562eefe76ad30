//! Case-level performance metrics and the performance report.

use std::fmt::Write;

use chrono::{NaiveDateTime, Timelike};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::analysis::stats::{mean, median, sample_std};
use crate::core::constants::{defaults, display};
use crate::dataset::event_log::sort_counts;
use crate::dataset::{Case, EventLog};

/// Metrics of one case (one student in one session).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseMetrics {
    pub case_id: String,
    pub student_id: Option<String>,
    pub session: Option<u32>,
    pub total_events: usize,
    pub total_duration_hours: f64,
    pub unique_activities: usize,
    pub activity_diversity: f64,
    pub total_clicks: f64,
    pub total_keystrokes: f64,
    pub total_mouse_movement: f64,
    pub total_idle_time_minutes: f64,
    pub deeds_time_ratio: f64,
    pub study_time_ratio: f64,
    pub texteditor_time_ratio: f64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl CaseMetrics {
    /// `None` for an empty case.
    pub fn compute(case: &Case<'_>) -> Option<Self> {
        let first = case.events.first()?;
        let last = case.events.last()?;
        let total = case.events.len();
        let share = |needle: &str| {
            case.events
                .iter()
                .filter(|e| e.activity.contains(needle))
                .count() as f64
                / total as f64
        };

        let mut unique: Vec<&str> = case.events.iter().map(|e| e.activity.as_str()).collect();
        unique.sort_unstable();
        unique.dedup();

        Some(Self {
            case_id: case.case_id.to_string(),
            student_id: first.student_id.clone(),
            session: first.session,
            total_events: total,
            total_duration_hours: case.span_seconds() / 3600.0,
            unique_activities: unique.len(),
            activity_diversity: unique.len() as f64 / total as f64,
            total_clicks: case.events.iter().map(|e| e.interaction.clicks()).sum(),
            total_keystrokes: case.events.iter().map(|e| e.interaction.keystroke).sum(),
            total_mouse_movement: case.events.iter().map(|e| e.interaction.mouse_movement).sum(),
            total_idle_time_minutes: case
                .events
                .iter()
                .map(|e| e.interaction.idle_time)
                .sum::<f64>()
                / 1000.0
                / 60.0,
            deeds_time_ratio: share("Deeds"),
            study_time_ratio: share("Study"),
            texteditor_time_ratio: share("TextEditor"),
            start_time: first.timestamp,
            end_time: last.timestamp,
        })
    }
}

/// Per-case metrics for every case, computed in parallel, in case-id order.
pub fn compute_case_metrics(log: &EventLog) -> Vec<CaseMetrics> {
    let mut metrics: Vec<CaseMetrics> = log
        .cases()
        .par_iter()
        .filter_map(CaseMetrics::compute)
        .collect();
    metrics.sort_by(|a, b| a.case_id.cmp(&b.case_id));
    metrics
}

/// Duration statistics of one activity, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityPatterns {
    pub activity_frequency: Vec<(String, usize)>,
    /// `(from, to, count)`, most frequent first
    pub top_transitions: Vec<(String, String, usize)>,
    /// Event counts per hour of day that has events
    pub hourly_distribution: Vec<(u32, usize)>,
    /// Sorted by activity name
    pub activity_durations: Vec<(String, DurationStats)>,
}

impl ActivityPatterns {
    pub fn compute(log: &EventLog, top_transitions: usize) -> Self {
        let mut transitions: FxHashMap<(&str, &str), usize> = FxHashMap::default();
        for case in log.cases() {
            for pair in case.transitions() {
                *transitions.entry(pair).or_default() += 1;
            }
        }
        let mut transitions: Vec<(String, String, usize)> = transitions
            .into_iter()
            .map(|((a, b), n)| (a.to_string(), b.to_string(), n))
            .collect();
        transitions.sort_by(|x, y| {
            y.2.cmp(&x.2)
                .then_with(|| x.0.cmp(&y.0))
                .then_with(|| x.1.cmp(&y.1))
        });
        transitions.truncate(top_transitions);

        let mut hourly = [0usize; 24];
        let mut durations: FxHashMap<&str, Vec<f64>> = FxHashMap::default();
        for event in log.events() {
            hourly[event.timestamp.hour() as usize] += 1;
            if let Some(duration) = event.duration {
                durations.entry(event.activity.as_str()).or_default().push(duration);
            }
        }

        let mut activity_durations: Vec<(String, DurationStats)> = durations
            .into_iter()
            .map(|(activity, values)| {
                (
                    activity.to_string(),
                    DurationStats {
                        mean: mean(&values),
                        median: median(&values),
                        std: sample_std(&values),
                    },
                )
            })
            .collect();
        activity_durations.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            activity_frequency: log.activity_counts(),
            top_transitions: transitions,
            hourly_distribution: hourly
                .iter()
                .enumerate()
                .filter(|(_, n)| **n > 0)
                .map(|(h, n)| (h as u32, *n))
                .collect(),
            activity_durations,
        }
    }
}

/// Drop consecutive repeats of the same activity.
pub fn collapse_repeats<'a>(trace: &[&'a str]) -> Vec<&'a str> {
    let mut path: Vec<&str> = trace.to_vec();
    path.dedup();
    path
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LearningPaths {
    pub total_variants: usize,
    /// Collapsed paths with case counts, most common first
    pub most_common_paths: Vec<(Vec<String>, usize)>,
    /// Distinct exercises in order of first appearance, with case counts
    pub exercise_patterns: Vec<(Vec<String>, usize)>,
}

impl LearningPaths {
    pub fn compute(log: &EventLog, top: usize) -> Self {
        let mut paths: FxHashMap<Vec<&str>, usize> = FxHashMap::default();
        let mut exercises: FxHashMap<Vec<&str>, usize> = FxHashMap::default();

        for case in log.cases() {
            *paths.entry(collapse_repeats(&case.trace())).or_default() += 1;

            let mut sequence: Vec<&str> = Vec::new();
            for exercise in case.events.iter().filter_map(|e| e.exercise.as_deref()) {
                if !exercise.is_empty() && !sequence.contains(&exercise) {
                    sequence.push(exercise);
                }
            }
            if !sequence.is_empty() {
                *exercises.entry(sequence).or_default() += 1;
            }
        }

        let rank = |counts: FxHashMap<Vec<&str>, usize>| {
            let mut ranked: Vec<(Vec<String>, usize)> = counts
                .into_iter()
                .map(|(k, n)| (k.into_iter().map(str::to_string).collect(), n))
                .collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked
        };

        let total_variants = paths.len();
        let mut most_common_paths = rank(paths);
        most_common_paths.truncate(top);

        Self {
            total_variants,
            most_common_paths,
            exercise_patterns: rank(exercises),
        }
    }
}

/// Averages over the cases of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// `Session_<n>`
    pub label: String,
    pub session: u32,
    pub student_count: usize,
    pub avg_duration_hours: f64,
    pub avg_events: f64,
    pub avg_activity_diversity: f64,
    pub avg_clicks: f64,
    pub avg_keystrokes: f64,
    pub avg_idle_time_minutes: f64,
    pub deeds_usage: f64,
    pub study_usage: f64,
    pub texteditor_usage: f64,
}

/// Session summaries in ascending session order; cases without a session are skipped.
pub fn summarize_sessions(metrics: &[CaseMetrics]) -> Vec<SessionSummary> {
    let mut sessions: Vec<u32> = metrics.iter().filter_map(|m| m.session).collect();
    sessions.sort_unstable();
    sessions.dedup();

    sessions
        .into_iter()
        .map(|session| {
            let rows: Vec<&CaseMetrics> =
                metrics.iter().filter(|m| m.session == Some(session)).collect();
            let avg = |f: fn(&CaseMetrics) -> f64| {
                mean(&rows.iter().map(|m| f(m)).collect::<Vec<f64>>())
            };
            SessionSummary {
                label: format!("Session_{session}"),
                session,
                student_count: rows.len(),
                avg_duration_hours: avg(|m| m.total_duration_hours),
                avg_events: avg(|m| m.total_events as f64),
                avg_activity_diversity: avg(|m| m.activity_diversity),
                avg_clicks: avg(|m| m.total_clicks),
                avg_keystrokes: avg(|m| m.total_keystrokes),
                avg_idle_time_minutes: avg(|m| m.total_idle_time_minutes),
                deeds_usage: avg(|m| m.deeds_time_ratio),
                study_usage: avg(|m| m.study_time_ratio),
                texteditor_usage: avg(|m| m.texteditor_time_ratio),
            }
        })
        .collect()
}

/// Result of the performance stage.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceAnalysis {
    pub metrics: Vec<CaseMetrics>,
    pub patterns: ActivityPatterns,
    pub learning_paths: LearningPaths,
    pub sessions: Vec<SessionSummary>,
}

fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

impl PerformanceAnalysis {
    pub fn run(log: &EventLog) -> Self {
        let metrics = compute_case_metrics(log);
        let sessions = summarize_sessions(&metrics);
        Self {
            patterns: ActivityPatterns::compute(log, defaults::TOP_TRANSITIONS),
            learning_paths: LearningPaths::compute(log, defaults::TOP_VARIANTS),
            metrics,
            sessions,
        }
    }

    fn column(&self, f: impl Fn(&CaseMetrics) -> f64) -> Vec<f64> {
        self.metrics.iter().map(f).collect()
    }

    /// Distinct students; cases without a student id count individually.
    pub fn student_count(&self) -> usize {
        let mut ids: Vec<&str> = self
            .metrics
            .iter()
            .map(|m| m.student_id.as_deref().unwrap_or(m.case_id.as_str()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn avg_duration_hours(&self) -> f64 {
        mean(&self.column(|m| m.total_duration_hours))
    }

    pub fn avg_events(&self) -> f64 {
        mean(&self.column(|m| m.total_events as f64))
    }

    pub fn avg_diversity(&self) -> f64 {
        mean(&self.column(|m| m.activity_diversity))
    }

    /// Plain-text performance report.
    pub fn report(&self) -> String {
        let banner = "=".repeat(display::BANNER_WIDTH);
        let rule = "-".repeat(30);
        let mut r = String::new();

        let _ = writeln!(r, "{banner}");
        let _ = writeln!(r, "EDUCATIONAL PROCESS MINING - PERFORMANCE ANALYSIS REPORT");
        let _ = writeln!(r, "{banner}");

        let _ = writeln!(r, "\n1. OVERALL STATISTICS\n{rule}");
        let _ = writeln!(r, "Total Students Analyzed: {}", self.student_count());
        let _ = writeln!(r, "Total Learning Sessions: {}", self.metrics.len());
        let _ = writeln!(
            r,
            "Average Session Duration: {:.2} hours",
            self.avg_duration_hours()
        );
        let _ = writeln!(r, "Average Events per Session: {:.1}", self.avg_events());
        let _ = writeln!(r, "Average Activity Diversity: {:.3}", self.avg_diversity());

        let _ = writeln!(r, "\n2. ACTIVITY PATTERNS\n{rule}");
        let _ = writeln!(r, "Top 5 Most Frequent Activities:");
        for (i, (activity, count)) in self.patterns.activity_frequency.iter().take(5).enumerate() {
            let _ = writeln!(r, "  {}. {activity}: {count} occurrences", i + 1);
        }

        let _ = writeln!(r, "\n3. LEARNING PATH ANALYSIS\n{rule}");
        let _ = writeln!(
            r,
            "Total Unique Learning Paths: {}",
            self.learning_paths.total_variants
        );
        let _ = writeln!(r, "Most Common Learning Patterns:");
        for (i, (path, count)) in self.learning_paths.most_common_paths.iter().take(3).enumerate() {
            let head: Vec<&str> = path.iter().take(5).map(String::as_str).collect();
            let ellipsis = if path.len() > 5 { "..." } else { "" };
            let _ = writeln!(
                r,
                "  {}. {}{ellipsis} ({count} students)",
                i + 1,
                head.join(" → ")
            );
        }

        if self.sessions.iter().any(|s| s.session == 1) {
            let _ = writeln!(r, "\n4. SESSION COMPARISON\n{rule}");
            for s in &self.sessions {
                let _ = writeln!(r, "{}:", s.label);
                let _ = writeln!(r, "  Students: {}", s.student_count);
                let _ = writeln!(r, "  Avg Duration: {:.2} hours", s.avg_duration_hours);
                let _ = writeln!(r, "  Avg Events: {:.1}", s.avg_events);
                let _ = writeln!(r, "  DEEDS Usage: {}", percent(s.deeds_usage));
                let _ = writeln!(r);
            }
        }

        let _ = writeln!(r, "\n5. KEY INSIGHTS\n{rule}");
        let durations = self.column(|m| m.total_duration_hours);
        let duration_median = median(&durations);
        let long_sessions = durations.iter().filter(|d| **d > duration_median * 1.5).count();
        let _ = writeln!(
            r,
            "• {long_sessions} students had unusually long sessions (>1.5x median)"
        );
        let diversity = self.column(|m| m.activity_diversity);
        let diversity_median = median(&diversity);
        let diverse = diversity.iter().filter(|d| **d > diversity_median * 1.5).count();
        let _ = writeln!(r, "• {diverse} students showed high activity diversity");
        let deeds = self.metrics.iter().filter(|m| m.deeds_time_ratio > 0.5).count();
        let study = self.metrics.iter().filter(|m| m.study_time_ratio > 0.3).count();
        let _ = writeln!(
            r,
            "• {deeds} students heavily used DEEDS simulator (>50% time)"
        );
        let _ = writeln!(
            r,
            "• {study} students spent significant time on study materials (>30%)"
        );

        let _ = write!(r, "\n{banner}");
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Event, Interaction};
    use crate::dataset::event_log::fixtures::{base_time, log_from_traces};
    use chrono::Duration;

    fn interaction_log() -> EventLog {
        let t = base_time();
        let interaction = Interaction {
            idle_time: 60_000.0,
            mouse_click_left: 2.0,
            mouse_click_right: 1.0,
            keystroke: 10.0,
            mouse_movement: 100.0,
            ..Default::default()
        };
        let mut events = Vec::new();
        for (i, activity) in ["Study_Es_1_1", "Deeds_Es_1_1", "Deeds_Es_1_1", "TextEditor_Es_1_1"]
            .iter()
            .enumerate()
        {
            let mut event = Event::new("Student_1_Session_1", *activity, t + Duration::minutes(30 * i as i64))
                .with_session(1)
                .with_exercise("Es_1_1")
                .with_interaction(interaction);
            event.student_id = Some("1".to_string());
            events.push(event);
        }
        EventLog::from_events(events)
    }

    #[test]
    fn test_case_metrics() {
        let metrics = compute_case_metrics(&interaction_log());
        assert_eq!(metrics.len(), 1);
        let m = &metrics[0];
        assert_eq!(m.total_events, 4);
        assert_eq!(m.total_duration_hours, 1.5);
        assert_eq!(m.unique_activities, 3);
        assert_eq!(m.activity_diversity, 0.75);
        assert_eq!(m.total_clicks, 12.0);
        assert_eq!(m.total_keystrokes, 40.0);
        assert_eq!(m.total_mouse_movement, 400.0);
        assert_eq!(m.total_idle_time_minutes, 4.0);
        assert_eq!(m.deeds_time_ratio, 0.5);
        assert_eq!(m.study_time_ratio, 0.25);
        assert_eq!(m.texteditor_time_ratio, 0.25);
    }

    #[test]
    fn test_case_metrics_sorted_by_case() {
        let log = log_from_traces(&[("z", &["A"]), ("a", &["B"]), ("m", &["C"])]);
        let ids: Vec<String> = compute_case_metrics(&log).into_iter().map(|m| m.case_id).collect();
        assert_eq!(ids, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_activity_patterns() {
        let log = log_from_traces(&[("c1", &["A", "B", "A", "B"]), ("c2", &["A", "B"])]);
        let patterns = ActivityPatterns::compute(&log, 1);
        assert_eq!(patterns.top_transitions, vec![("A".to_string(), "B".to_string(), 3)]);
        assert_eq!(patterns.hourly_distribution, vec![(9, 6)]);
        let (name, stats) = &patterns.activity_durations[0];
        assert_eq!(name, "A");
        assert_eq!(stats.mean, 60.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_collapse_repeats() {
        assert_eq!(collapse_repeats(&["A", "A", "B", "A", "A"]), vec!["A", "B", "A"]);
        assert!(collapse_repeats(&[]).is_empty());
    }

    #[test]
    fn test_learning_paths() {
        let log = log_from_traces(&[
            ("c1", &["A", "A", "B"]),
            ("c2", &["A", "B", "B"]),
            ("c3", &["B"]),
        ]);
        let paths = LearningPaths::compute(&log, 10);
        assert_eq!(paths.total_variants, 2);
        assert_eq!(paths.most_common_paths[0], (vec!["A".to_string(), "B".to_string()], 2));
        assert!(paths.exercise_patterns.is_empty());
    }

    #[test]
    fn test_summarize_sessions() {
        let analysis = PerformanceAnalysis::run(&interaction_log());
        assert_eq!(analysis.sessions.len(), 1);
        let s = &analysis.sessions[0];
        assert_eq!(s.label, "Session_1");
        assert_eq!(s.student_count, 1);
        assert_eq!(s.deeds_usage, 0.5);
        assert_eq!(
            analysis.learning_paths.exercise_patterns,
            vec![(vec!["Es_1_1".to_string()], 1)]
        );
    }

    #[test]
    fn test_report_sections() {
        let report = PerformanceAnalysis::run(&interaction_log()).report();
        assert!(report.starts_with(&"=".repeat(60)));
        assert!(report.contains("EDUCATIONAL PROCESS MINING - PERFORMANCE ANALYSIS REPORT"));
        assert!(report.contains("Average Session Duration: 1.50 hours"));
        assert!(report.contains("Average Events per Session: 4.0"));
        assert!(report.contains("Average Activity Diversity: 0.750"));
        assert!(report.contains("  1. Deeds_Es_1_1: 2 occurrences"));
        assert!(report.contains("Study_Es_1_1 → Deeds_Es_1_1 → TextEditor_Es_1_1 (1 students)"));
        assert!(report.contains("4. SESSION COMPARISON"));
        assert!(report.contains("  DEEDS Usage: 50.0%"));
        assert!(report.contains("5. KEY INSIGHTS"));
    }

    #[test]
    fn test_report_on_empty_log() {
        let report = PerformanceAnalysis::run(&EventLog::default()).report();
        assert!(report.contains("Total Learning Sessions: 0"));
        assert!(!report.contains("NaN"));
        assert!(!report.contains("SESSION COMPARISON"));
    }
}
