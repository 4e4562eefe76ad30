//! Conformance of student behaviour against a fixed reference model.
//!
//! Two scores are computed per case. The sequence score rewards expected
//! transitions and ordered exercise progression. The behavioural score is the
//! fraction of time-allocation checks a case passes.

use std::fmt::Write;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::analysis::stats::{mean, population_std};
use crate::core::constants::display;
use crate::dataset::{Case, EventLog};

/// Expected learning process.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceModel {
    pub ideal_sequence: Vec<&'static str>,
    /// `(from, to)` to transition kind
    pub expected_transitions: Vec<((&'static str, &'static str), &'static str)>,
    /// Category name to member activities, in display order
    pub categories: Vec<(&'static str, Vec<&'static str>)>,
    pub min_study_ratio: f64,
    pub min_practice_ratio: f64,
    pub max_other_ratio: f64,
}

pub static REFERENCE_MODEL: Lazy<ReferenceModel> = Lazy::new(|| ReferenceModel {
    ideal_sequence: vec![
        "Study_Es_1_1",
        "Deeds_Es_1_1",
        "TextEditor_Es_1_1",
        "Study_Es_1_2",
        "Deeds_Es_1_2",
        "TextEditor_Es_1_2",
    ],
    expected_transitions: vec![
        (("Study_Es_1_1", "Deeds_Es_1_1"), "study_to_practice"),
        (("Deeds_Es_1_1", "TextEditor_Es_1_1"), "practice_to_document"),
        (("Study_Es_1_2", "Deeds_Es_1_2"), "study_to_practice"),
        (("Deeds_Es_1_2", "TextEditor_Es_1_2"), "practice_to_document"),
        (("Aulaweb", "Study_Es_1_1"), "platform_to_study"),
        (("TextEditor_Es_1_1", "Study_Es_1_2"), "progression_to_next"),
        (("Properties", "Deeds_Es_1_1"), "setup_to_practice"),
        (("Diagram", "TextEditor_Es_1_1"), "verification_to_document"),
    ],
    categories: vec![
        ("preparation", vec!["Aulaweb", "Study_Materials"]),
        ("study", vec!["Study_Es_1_1", "Study_Es_1_2", "Study_Es_1_3"]),
        (
            "practice",
            vec!["Deeds_Es_1_1", "Deeds_Es_1_2", "Deeds_Es_1_3", "Deeds"],
        ),
        ("verification", vec!["Diagram", "Properties"]),
        (
            "documentation",
            vec![
                "TextEditor_Es_1_1",
                "TextEditor_Es_1_2",
                "TextEditor_Es_1_3",
                "TextEditor",
            ],
        ),
        ("other", vec!["FSM_Es", "FSM_Related"]),
    ],
    min_study_ratio: 0.1,
    min_practice_ratio: 0.2,
    max_other_ratio: 0.3,
});

impl ReferenceModel {
    pub fn is_expected(&self, from: &str, to: &str) -> bool {
        self.expected_transitions
            .iter()
            .any(|((a, b), _)| *a == from && *b == to)
    }

    /// Kind of an expected transition, `None` for unexpected ones
    pub fn transition_kind(&self, from: &str, to: &str) -> Option<&'static str> {
        self.expected_transitions
            .iter()
            .find(|((a, b), _)| *a == from && *b == to)
            .map(|(_, kind)| *kind)
    }
}

/// Exercise number of an activity such as `Deeds_Es_1_2`.
pub fn exercise_number(activity: &str) -> Option<u32> {
    let (_, rest) = activity.rsplit_once("Es_1_")?;
    let digits = rest.split('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceConformance {
    pub total_transitions: usize,
    pub expected_transitions: usize,
    pub conformance_ratio: f64,
    pub unexpected_transitions: Vec<(String, String)>,
    pub exercises_encountered: Vec<u32>,
    pub exercise_order_correct: bool,
    /// `0.7 * ratio + 0.3 * order`
    pub score: f64,
}

impl SequenceConformance {
    pub fn compute(case: &Case<'_>, model: &ReferenceModel) -> Self {
        let mut expected = 0;
        let mut unexpected = Vec::new();
        for (a, b) in case.transitions() {
            if model.is_expected(a, b) {
                expected += 1;
            } else {
                unexpected.push((a.to_string(), b.to_string()));
            }
        }
        let total = expected + unexpected.len();
        let ratio = if total > 0 {
            expected as f64 / total as f64
        } else {
            0.0
        };

        let mut exercises: Vec<u32> = Vec::new();
        for number in case.events.iter().filter_map(|e| exercise_number(&e.activity)) {
            if !exercises.contains(&number) {
                exercises.push(number);
            }
        }
        let ordered = exercises.windows(2).all(|w| w[0] <= w[1]);

        Self {
            total_transitions: total,
            expected_transitions: expected,
            conformance_ratio: ratio,
            unexpected_transitions: unexpected,
            exercises_encountered: exercises,
            exercise_order_correct: ordered,
            score: ratio * 0.7 + if ordered { 0.3 } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehavioralConformance {
    /// Category name to share of the case's events, in model order
    pub category_ratios: Vec<(String, f64)>,
    pub sufficient_study: bool,
    pub sufficient_practice: bool,
    pub limited_other: bool,
    pub score: f64,
    pub total_events: usize,
}

impl BehavioralConformance {
    pub fn compute(case: &Case<'_>, model: &ReferenceModel) -> Self {
        let total = case.events.len();
        let category_ratios: Vec<(String, f64)> = model
            .categories
            .iter()
            .map(|(name, members)| {
                let n = case
                    .events
                    .iter()
                    .filter(|e| members.contains(&e.activity.as_str()))
                    .count();
                let ratio = if total > 0 { n as f64 / total as f64 } else { 0.0 };
                (name.to_string(), ratio)
            })
            .collect();
        let ratio_of = |name: &str| {
            category_ratios
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, r)| *r)
                .unwrap_or(0.0)
        };

        let sufficient_study = ratio_of("study") >= model.min_study_ratio;
        let sufficient_practice = ratio_of("practice") >= model.min_practice_ratio;
        let limited_other = ratio_of("other") <= model.max_other_ratio;
        let passed = [sufficient_study, sufficient_practice, limited_other]
            .iter()
            .filter(|c| **c)
            .count();

        Self {
            sufficient_study,
            sufficient_practice,
            limited_other,
            score: passed as f64 / 3.0,
            total_events: total,
            category_ratios,
        }
    }

    pub fn ratio(&self, category: &str) -> f64 {
        self.category_ratios
            .iter()
            .find(|(n, _)| n == category)
            .map(|(_, r)| *r)
            .unwrap_or(0.0)
    }
}

/// Deviation classes, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationKind {
    LowSequenceConformance,
    PoorExerciseProgression,
    InsufficientStudyTime,
    InsufficientPracticeTime,
    ExcessiveOtherActivities,
    OverallLowConformance,
}

impl DeviationKind {
    pub const ALL: [DeviationKind; 6] = [
        DeviationKind::LowSequenceConformance,
        DeviationKind::PoorExerciseProgression,
        DeviationKind::InsufficientStudyTime,
        DeviationKind::InsufficientPracticeTime,
        DeviationKind::ExcessiveOtherActivities,
        DeviationKind::OverallLowConformance,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DeviationKind::LowSequenceConformance => "Low Sequence Conformance",
            DeviationKind::PoorExerciseProgression => "Poor Exercise Progression",
            DeviationKind::InsufficientStudyTime => "Insufficient Study Time",
            DeviationKind::InsufficientPracticeTime => "Insufficient Practice Time",
            DeviationKind::ExcessiveOtherActivities => "Excessive Other Activities",
            DeviationKind::OverallLowConformance => "Overall Low Conformance",
        }
    }
}

/// A case flagged with one deviation kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deviation {
    pub case_id: String,
    pub kind: DeviationKind,
    /// The measure that triggered the flag (ratio or score)
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseConformance {
    pub case_id: String,
    pub sequence: SequenceConformance,
    pub behavioral: BehavioralConformance,
}

impl CaseConformance {
    pub fn overall(&self) -> f64 {
        (self.sequence.score + self.behavioral.score) / 2.0
    }
}

/// Number of cases flagged with one deviation kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationCount {
    pub kind: DeviationKind,
    pub title: &'static str,
    pub cases: usize,
}

/// Aggregate view served by the enhanced dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConformanceSummary {
    pub cases: usize,
    pub avg_sequence: f64,
    pub avg_behavioral: f64,
    pub avg_overall: f64,
    pub best_practice_cases: usize,
    pub deviations: Vec<DeviationCount>,
    pub recommendations: Vec<&'static str>,
}

/// Result of the conformance stage.
#[derive(Debug, Clone, Serialize)]
pub struct ConformanceAnalysis {
    /// In case-id order
    pub cases: Vec<CaseConformance>,
    pub deviations: Vec<Deviation>,
}

fn classify(case: &CaseConformance) -> Vec<Deviation> {
    let flag = |kind, value| Deviation {
        case_id: case.case_id.clone(),
        kind,
        value,
    };
    let mut found = Vec::new();
    if case.sequence.conformance_ratio < 0.3 {
        found.push(flag(
            DeviationKind::LowSequenceConformance,
            case.sequence.conformance_ratio,
        ));
    }
    if !case.sequence.exercise_order_correct {
        found.push(flag(DeviationKind::PoorExerciseProgression, case.sequence.score));
    }
    if !case.behavioral.sufficient_study {
        found.push(flag(
            DeviationKind::InsufficientStudyTime,
            case.behavioral.ratio("study"),
        ));
    }
    if !case.behavioral.sufficient_practice {
        found.push(flag(
            DeviationKind::InsufficientPracticeTime,
            case.behavioral.ratio("practice"),
        ));
    }
    if !case.behavioral.limited_other {
        found.push(flag(
            DeviationKind::ExcessiveOtherActivities,
            case.behavioral.ratio("other"),
        ));
    }
    if case.overall() < 0.5 {
        found.push(flag(DeviationKind::OverallLowConformance, case.overall()));
    }
    found
}

impl ConformanceAnalysis {
    pub fn run(log: &EventLog) -> Self {
        Self::run_with_model(log, &REFERENCE_MODEL)
    }

    pub fn run_with_model(log: &EventLog, model: &ReferenceModel) -> Self {
        let cases: Vec<CaseConformance> = log
            .cases()
            .iter()
            .map(|case| CaseConformance {
                case_id: case.case_id.to_string(),
                sequence: SequenceConformance::compute(case, model),
                behavioral: BehavioralConformance::compute(case, model),
            })
            .collect();
        let deviations = cases.iter().flat_map(classify).collect();
        Self { cases, deviations }
    }

    pub fn of_kind(&self, kind: DeviationKind) -> Vec<&Deviation> {
        self.deviations.iter().filter(|d| d.kind == kind).collect()
    }

    /// Number of cases per deviation kind, in report order
    pub fn deviation_counts(&self) -> Vec<(DeviationKind, usize)> {
        let mut counts: FxHashMap<DeviationKind, usize> = FxHashMap::default();
        for deviation in &self.deviations {
            *counts.entry(deviation.kind).or_default() += 1;
        }
        DeviationKind::ALL
            .iter()
            .map(|kind| (*kind, counts.get(kind).copied().unwrap_or(0)))
            .collect()
    }

    pub fn sequence_scores(&self) -> Vec<f64> {
        self.cases.iter().map(|c| c.sequence.score).collect()
    }

    pub fn behavioral_scores(&self) -> Vec<f64> {
        self.cases.iter().map(|c| c.behavioral.score).collect()
    }

    /// Cases scoring above 0.8 on both measures
    pub fn best_practice_cases(&self) -> Vec<&CaseConformance> {
        self.cases
            .iter()
            .filter(|c| c.sequence.score > 0.8 && c.behavioral.score > 0.8)
            .collect()
    }

    /// Improvement suggestions triggered by deviation shares.
    pub fn recommendations(&self) -> Vec<&'static str> {
        let total = self.cases.len() as f64;
        let count = |kind| self.of_kind(kind).len() as f64;
        let mut out = Vec::new();
        if count(DeviationKind::InsufficientStudyTime) > total * 0.3 {
            out.push("Encourage more time on study materials before practical exercises");
        }
        if count(DeviationKind::PoorExerciseProgression) > total * 0.2 {
            out.push("Provide clearer guidance on exercise progression order");
        }
        if count(DeviationKind::LowSequenceConformance) > total * 0.4 {
            out.push("Consider providing process guidelines or templates for students");
        }
        if count(DeviationKind::ExcessiveOtherActivities) > total * 0.3 {
            out.push("Reduce distractions and focus student attention on core activities");
        }
        out
    }

    pub fn summary(&self) -> ConformanceSummary {
        let overall: Vec<f64> = self.cases.iter().map(CaseConformance::overall).collect();
        ConformanceSummary {
            cases: self.cases.len(),
            avg_sequence: mean(&self.sequence_scores()),
            avg_behavioral: mean(&self.behavioral_scores()),
            avg_overall: mean(&overall),
            best_practice_cases: self.best_practice_cases().len(),
            deviations: self
                .deviation_counts()
                .into_iter()
                .map(|(kind, cases)| DeviationCount {
                    kind,
                    title: kind.title(),
                    cases,
                })
                .collect(),
            recommendations: self.recommendations(),
        }
    }

    /// Plain-text conformance report.
    pub fn report(&self, model: &ReferenceModel) -> String {
        let banner = "=".repeat(display::BANNER_WIDTH);
        let rule = "-".repeat(40);
        let seq = self.sequence_scores();
        let beh = self.behavioral_scores();
        let total = self.cases.len();
        let mut r = String::new();

        let _ = writeln!(r, "{banner}");
        let _ = writeln!(r, "EDUCATIONAL PROCESS MINING - CONFORMANCE ANALYSIS REPORT");
        let _ = writeln!(r, "{banner}");

        let _ = writeln!(r, "\n1. OVERALL CONFORMANCE STATISTICS\n{rule}");
        let _ = writeln!(r, "Total Cases Analyzed: {total}");
        let _ = writeln!(r, "Average Sequence Conformance: {:.3}", mean(&seq));
        let _ = writeln!(r, "Average Behavioral Conformance: {:.3}", mean(&beh));
        let _ = writeln!(r, "Standard Deviation (Sequence): {:.3}", population_std(&seq));
        let _ = writeln!(r, "Standard Deviation (Behavioral): {:.3}", population_std(&beh));
        let _ = writeln!(
            r,
            "High Sequence Conformance (>0.7): {} cases",
            seq.iter().filter(|s| **s > 0.7).count()
        );
        let _ = writeln!(
            r,
            "High Behavioral Conformance (>0.7): {} cases",
            beh.iter().filter(|s| **s > 0.7).count()
        );

        let _ = writeln!(r, "\n2. DEVIATION ANALYSIS\n{rule}");
        for (kind, count) in self.deviation_counts() {
            let pct = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(r, "{}: {count} cases ({pct:.1}%)", kind.title());
        }

        let _ = writeln!(r, "\n3. MOST COMMON DEVIATIONS\n{rule}");
        let low = self.of_kind(DeviationKind::LowSequenceConformance);
        if !low.is_empty() {
            let _ = writeln!(r, "Students with Low Sequence Conformance:");
            for d in low.iter().take(5) {
                let _ = writeln!(r, "  • {}: {:.3} conformance ratio", d.case_id, d.value);
            }
        }
        let study = self.of_kind(DeviationKind::InsufficientStudyTime);
        if !study.is_empty() {
            let _ = writeln!(r, "\nStudents with Insufficient Study Time:");
            for d in study.iter().take(5) {
                let _ = writeln!(r, "  • {}: {:.1}% study time", d.case_id, d.value * 100.0);
            }
        }

        let _ = writeln!(r, "\n4. BEST PRACTICES IDENTIFIED\n{rule}");
        let best = self.best_practice_cases();
        let _ = writeln!(r, "Students Following Best Practices: {}", best.len());
        if !best.is_empty() {
            let _ = writeln!(r, "Characteristics of High-Conformance Students:");
            for c in best.iter().take(3) {
                let _ = writeln!(
                    r,
                    "  • {}: Seq={:.3}, Beh={:.3}",
                    c.case_id, c.sequence.score, c.behavioral.score
                );
            }
        }

        let _ = writeln!(r, "\n5. RECOMMENDATIONS FOR IMPROVEMENT\n{rule}");
        for recommendation in self.recommendations() {
            let _ = writeln!(r, "• {recommendation}");
        }

        let _ = writeln!(r, "\n6. REFERENCE MODEL SUMMARY\n{rule}");
        let _ = writeln!(r, "Expected Learning Process:");
        for step in &model.ideal_sequence {
            let _ = writeln!(r, "  → {step}");
        }
        let _ = writeln!(r, "\nQuality Thresholds Used:");
        for (name, value) in [
            ("min_study_time_ratio", model.min_study_ratio),
            ("min_practice_time_ratio", model.min_practice_ratio),
            ("max_other_time_ratio", model.max_other_ratio),
        ] {
            let _ = writeln!(r, "  • {name}: {:.1}%", value * 100.0);
        }

        let _ = write!(r, "\n{banner}");
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::event_log::fixtures::log_from_traces;

    #[test]
    fn test_summary_of_empty_log() {
        let summary = ConformanceAnalysis::run(&EventLog::default()).summary();
        assert_eq!(summary.cases, 0);
        assert_eq!(summary.avg_overall, 0.0);
        assert_eq!(summary.deviations.len(), 6);
        assert!(summary.deviations.iter().all(|d| d.cases == 0));
    }

    #[test]
    fn test_summary_averages() {
        let log = log_from_traces(&[
            ("good", &["Study_Es_1_1", "Deeds_Es_1_1", "TextEditor_Es_1_1", "Study_Es_1_2"]),
            ("odd", &["Deeds"]),
        ]);
        let analysis = ConformanceAnalysis::run(&log);
        let summary = analysis.summary();
        assert_eq!(summary.cases, 2);
        let expected = analysis.cases.iter().map(|c| c.overall()).sum::<f64>() / 2.0;
        assert!((summary.avg_overall - expected).abs() < 1e-12);
        assert_eq!(summary.deviations[0].title, "Low Sequence Conformance");
    }

    #[test]
    fn test_exercise_number() {
        assert_eq!(exercise_number("Deeds_Es_1_2"), Some(2));
        assert_eq!(exercise_number("Study_Es_1_12"), Some(12));
        assert_eq!(exercise_number("TextEditor_Es_1_3_extra"), Some(3));
        assert_eq!(exercise_number("Deeds"), None);
        assert_eq!(exercise_number("Es_1_x"), None);
    }

    #[test]
    fn test_sequence_conformance_ideal_case() {
        let log = log_from_traces(&[(
            "c1",
            &["Study_Es_1_1", "Deeds_Es_1_1", "TextEditor_Es_1_1", "Study_Es_1_2"],
        )]);
        let case = log.cases()[0];
        let seq = SequenceConformance::compute(&case, &REFERENCE_MODEL);
        assert_eq!(seq.total_transitions, 3);
        assert_eq!(seq.expected_transitions, 3);
        assert_eq!(seq.conformance_ratio, 1.0);
        assert_eq!(seq.exercises_encountered, vec![1, 2]);
        assert!(seq.exercise_order_correct);
        assert!((seq.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_conformance_out_of_order() {
        let log = log_from_traces(&[("c1", &["Study_Es_1_2", "Aulaweb", "Study_Es_1_1"])]);
        let case = log.cases()[0];
        let seq = SequenceConformance::compute(&case, &REFERENCE_MODEL);
        assert_eq!(seq.expected_transitions, 1);
        assert_eq!(seq.conformance_ratio, 0.5);
        assert!(!seq.exercise_order_correct);
        assert!((seq.score - 0.35).abs() < 1e-12);
        assert_eq!(
            seq.unexpected_transitions,
            vec![("Study_Es_1_2".to_string(), "Aulaweb".to_string())]
        );
    }

    #[test]
    fn test_exercise_order_is_numeric() {
        let log = log_from_traces(&[("c1", &["Study_Es_1_2", "Study_Es_1_10"])]);
        let seq = SequenceConformance::compute(&log.cases()[0], &REFERENCE_MODEL);
        assert!(seq.exercise_order_correct);
    }

    #[test]
    fn test_single_event_case() {
        let log = log_from_traces(&[("c1", &["Deeds"])]);
        let seq = SequenceConformance::compute(&log.cases()[0], &REFERENCE_MODEL);
        assert_eq!(seq.total_transitions, 0);
        assert_eq!(seq.conformance_ratio, 0.0);
        assert!((seq.score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_behavioral_conformance() {
        // study 1/5, practice 2/5, other 2/5
        let log = log_from_traces(&[(
            "c1",
            &["Study_Es_1_1", "Deeds", "Deeds_Es_1_1", "FSM_Es", "FSM_Related"],
        )]);
        let beh = BehavioralConformance::compute(&log.cases()[0], &REFERENCE_MODEL);
        assert!(beh.sufficient_study);
        assert!(beh.sufficient_practice);
        assert!(!beh.limited_other);
        assert!((beh.score - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(beh.ratio("other"), 0.4);
        assert_eq!(beh.category_ratios.len(), 6);
    }

    #[test]
    fn test_deviations_and_recommendations() {
        let log = log_from_traces(&[
            ("bad", &["FSM_Es", "FSM_Related", "FSM_Es", "Study_Es_1_2", "Study_Es_1_1"]),
            (
                "good",
                &["Aulaweb", "Study_Es_1_1", "Deeds_Es_1_1", "TextEditor_Es_1_1", "Study_Es_1_2"],
            ),
        ]);
        let analysis = ConformanceAnalysis::run(&log);

        let kinds_for = |id: &str| -> Vec<DeviationKind> {
            analysis
                .deviations
                .iter()
                .filter(|d| d.case_id == id)
                .map(|d| d.kind)
                .collect()
        };
        assert!(kinds_for("good").is_empty());
        let bad = kinds_for("bad");
        assert!(bad.contains(&DeviationKind::LowSequenceConformance));
        assert!(bad.contains(&DeviationKind::PoorExerciseProgression));
        assert!(bad.contains(&DeviationKind::InsufficientPracticeTime));
        assert!(bad.contains(&DeviationKind::ExcessiveOtherActivities));
        assert!(bad.contains(&DeviationKind::OverallLowConformance));
        assert!(!bad.contains(&DeviationKind::InsufficientStudyTime));

        assert_eq!(analysis.best_practice_cases().len(), 1);
        let recs = analysis.recommendations();
        assert!(recs.contains(&"Provide clearer guidance on exercise progression order"));
        assert!(recs.contains(&"Consider providing process guidelines or templates for students"));
    }

    #[test]
    fn test_report_layout() {
        let log = log_from_traces(&[(
            "c1",
            &["Aulaweb", "Study_Es_1_1", "Deeds_Es_1_1", "TextEditor_Es_1_1"],
        )]);
        let analysis = ConformanceAnalysis::run(&log);
        let report = analysis.report(&REFERENCE_MODEL);

        assert!(report.contains("EDUCATIONAL PROCESS MINING - CONFORMANCE ANALYSIS REPORT"));
        assert!(report.contains("Total Cases Analyzed: 1"));
        assert!(report.contains("Average Sequence Conformance: 1.000"));
        assert!(report.contains("Low Sequence Conformance: 0 cases (0.0%)"));
        assert!(report.contains("Students Following Best Practices: 1"));
        assert!(report.contains("  → TextEditor_Es_1_2"));
        assert!(report.contains("  • min_practice_time_ratio: 20.0%"));
    }

    #[test]
    fn test_empty_log_report() {
        let analysis = ConformanceAnalysis::run(&EventLog::default());
        let report = analysis.report(&REFERENCE_MODEL);
        assert!(report.contains("Total Cases Analyzed: 0"));
        assert!(!report.contains("NaN"));
    }
}
