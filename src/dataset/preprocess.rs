use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use crate::dataset::event_log::EventLog;

/// Dataset-level statistics printed after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicStats {
    pub total_events: usize,
    pub total_cases: usize,
    pub total_activities: usize,
    pub total_students: usize,
    pub total_sessions: usize,
    pub date_start: Option<NaiveDateTime>,
    pub date_end: Option<NaiveDateTime>,
    pub avg_events_per_case: f64,
    /// Activity counts, most frequent first
    pub activity_distribution: Vec<(String, usize)>,
}

impl BasicStats {
    pub fn compute(log: &EventLog) -> Self {
        if log.is_empty() {
            return Self::default();
        }

        let events = log.events();
        let mut students: Vec<&str> = events
            .iter()
            .filter_map(|e| e.student_id.as_deref())
            .collect();
        students.sort_unstable();
        students.dedup();
        let mut sessions: Vec<u32> = events.iter().filter_map(|e| e.session).collect();
        sessions.sort_unstable();
        sessions.dedup();

        let total_cases = log.case_count();
        Self {
            total_events: events.len(),
            total_cases,
            total_activities: log.activities().len(),
            total_students: students.len(),
            total_sessions: sessions.len(),
            date_start: events.iter().map(|e| e.timestamp).min(),
            date_end: events.iter().map(|e| e.timestamp).max(),
            avg_events_per_case: events.len() as f64 / total_cases as f64,
            activity_distribution: log.activity_counts(),
        }
    }
}

/// Quality filter applied before discovery.
#[derive(Debug, Clone, Default)]
pub struct QualityFilter {
    pub exclude_activities: Vec<String>,
    pub exclude_patterns: Vec<Regex>,
    pub min_events_per_case: usize,
}

impl QualityFilter {
    /// Remove excluded activities first, then drop cases that became too short.
    pub fn apply(&self, log: &EventLog) -> EventLog {
        log.without_activities(&self.exclude_activities, &self.exclude_patterns)
            .with_min_events(self.min_events_per_case)
    }
}

const ACTIVITY_DESCRIPTIONS: [(&str, &str); 13] = [
    ("Study_Es", "Studying Exercise Content"),
    ("Deeds_Es", "Working in DEEDS Simulator"),
    ("Deeds", "DEEDS Related Activities"),
    ("TextEditor_Es", "Writing Exercise Solutions"),
    ("TextEditor", "Text Editor Activities"),
    ("Diagram", "Timing Diagram Simulation"),
    ("Properties", "Setting Component Properties"),
    ("Study_Materials", "Viewing Study Materials"),
    ("FSM_Es", "Finite State Machine Exercises"),
    ("FSM_Related", "FSM Related Activities"),
    ("Aulaweb", "Learning Management System"),
    ("Blank", "Blank Page"),
    ("Other", "Other Activities"),
];

/// Human readable description of an activity code.
///
/// Exercise-specific codes such as `Deeds_Es_1_2` resolve through their
/// longest known prefix.
pub fn describe_activity(activity: &str) -> Option<&'static str> {
    ACTIVITY_DESCRIPTIONS
        .iter()
        .filter(|(code, _)| activity == *code || activity.starts_with(&format!("{code}_")))
        .max_by_key(|(code, _)| code.len())
        .map(|(_, description)| *description)
}
