use std::collections::BTreeSet;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::core::types::Event;

/// A case is a contiguous, time-ordered slice of the log.
#[derive(Debug, Clone, Copy)]
pub struct Case<'a> {
    pub case_id: &'a str,
    pub events: &'a [Event],
}

impl<'a> Case<'a> {
    /// Activity names in order
    pub fn trace(&self) -> Vec<&'a str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    /// Directly-follows pairs of the case
    pub fn transitions(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.events
            .windows(2)
            .map(|w| (w[0].activity.as_str(), w[1].activity.as_str()))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Session of the first event
    pub fn session(&self) -> Option<u32> {
        self.events.first().and_then(|e| e.session)
    }

    /// Seconds between the first start and the last start
    pub fn span_seconds(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0
            }
            _ => 0.0,
        }
    }
}

/// Events sorted by `(case_id, timestamp)`.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from unordered events.
    ///
    /// Activity names are trimmed, events are sorted stably by case and
    /// timestamp, and `event_index` is renumbered from 1 inside each case.
    pub fn from_events(mut events: Vec<Event>) -> Self {
        for event in &mut events {
            let trimmed = event.activity.trim();
            if trimmed.len() != event.activity.len() {
                event.activity = trimmed.to_string();
            }
        }
        events.sort_by(|a, b| {
            a.case_id
                .cmp(&b.case_id)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        let mut log = Self { events };
        log.reindex();
        log
    }

    fn reindex(&mut self) {
        let mut current: Option<String> = None;
        let mut index = 0;
        for event in &mut self.events {
            if current.as_deref() != Some(event.case_id.as_str()) {
                current = Some(event.case_id.clone());
                index = 0;
            }
            index += 1;
            event.event_index = index;
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Cases in case-id order
    pub fn cases(&self) -> Vec<Case<'_>> {
        self.events
            .chunk_by(|a, b| a.case_id == b.case_id)
            .map(|events| Case {
                case_id: events[0].case_id.as_str(),
                events,
            })
            .collect()
    }

    pub fn case_count(&self) -> usize {
        self.cases().len()
    }

    /// Distinct activity names, sorted
    pub fn activities(&self) -> BTreeSet<&str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    /// Activity counts sorted by descending count, ties by name.
    pub fn activity_counts(&self) -> Vec<(String, usize)> {
        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for event in &self.events {
            *counts.entry(event.activity.as_str()).or_default() += 1;
        }
        sort_counts(counts)
    }

    /// Drop events whose activity is listed or matches one of the patterns.
    pub fn without_activities(&self, excluded: &[String], patterns: &[Regex]) -> Self {
        let events = self
            .events
            .iter()
            .filter(|e| {
                !excluded.iter().any(|x| x == &e.activity)
                    && !patterns.iter().any(|p| p.is_match(&e.activity))
            })
            .cloned()
            .collect();
        let mut log = Self { events };
        log.reindex();
        log
    }

    /// Keep only cases with at least `min_events` events.
    pub fn with_min_events(&self, min_events: usize) -> Self {
        let events = self
            .cases()
            .into_iter()
            .filter(|case| case.len() >= min_events)
            .flat_map(|case| case.events.iter().cloned())
            .collect();
        Self { events }
    }
}

/// Sort `(key, count)` pairs by descending count, then ascending key.
pub fn sort_counts<K: AsRef<str>>(counts: impl IntoIterator<Item = (K, usize)>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    pub fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    /// Build a log where each event lasts 60 seconds and starts one minute
    /// after the previous one.
    pub fn log_from_traces(traces: &[(&str, &[&str])]) -> EventLog {
        let mut events = Vec::new();
        for (case_id, activities) in traces {
            for (i, activity) in activities.iter().enumerate() {
                let start = base_time() + Duration::minutes(i as i64);
                events.push(
                    Event::new(*case_id, *activity, start)
                        .with_end_time(start + Duration::seconds(60))
                        .with_session(1),
                );
            }
        }
        EventLog::from_events(events)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_from_events_sorts_and_indexes() {
        let t = base_time();
        let events = vec![
            Event::new("b", "Deeds", t + Duration::minutes(1)),
            Event::new("a", " Study ", t + Duration::minutes(2)),
            Event::new("b", "Aulaweb", t),
            Event::new("a", "Aulaweb", t),
        ];
        let log = EventLog::from_events(events);

        let summary: Vec<(&str, &str, usize)> = log
            .events()
            .iter()
            .map(|e| (e.case_id.as_str(), e.activity.as_str(), e.event_index))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", "Aulaweb", 1),
                ("a", "Study", 2),
                ("b", "Aulaweb", 1),
                ("b", "Deeds", 2),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let t = base_time();
        let events = vec![
            Event::new("a", "first", t),
            Event::new("a", "second", t),
            Event::new("a", "third", t),
        ];
        let log = EventLog::from_events(events);
        let case = log.cases()[0];
        assert_eq!(case.trace(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cases_and_transitions() {
        let log = log_from_traces(&[("c1", &["A", "B", "C"]), ("c2", &["A", "C"])]);
        let cases = log.cases();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].case_id, "c1");
        let transitions: Vec<_> = cases[0].transitions().collect();
        assert_eq!(transitions, vec![("A", "B"), ("B", "C")]);
        assert_eq!(cases[1].span_seconds(), 60.0);
    }

    #[test]
    fn test_activity_counts_ties_by_name() {
        let log = log_from_traces(&[("c1", &["B", "A", "C", "C"])]);
        assert_eq!(
            log.activity_counts(),
            vec![
                ("C".to_string(), 2),
                ("A".to_string(), 1),
                ("B".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_without_activities_reindexes() {
        let log = log_from_traces(&[("c1", &["Blank", "A", "Other", "B"])]);
        let filtered = log.without_activities(&["Blank".to_string(), "Other".to_string()], &[]);
        let indexes: Vec<usize> = filtered.events().iter().map(|e| e.event_index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert_eq!(filtered.cases()[0].trace(), vec!["A", "B"]);
    }

    #[test]
    fn test_without_activities_by_pattern() {
        let log = log_from_traces(&[("c1", &["FSM_Es", "FSM_Related", "Deeds"])]);
        let patterns = vec![Regex::new("^FSM").unwrap()];
        let filtered = log.without_activities(&[], &patterns);
        assert_eq!(filtered.cases()[0].trace(), vec!["Deeds"]);
    }

    #[test]
    fn test_with_min_events() {
        let log = log_from_traces(&[("short", &["A"]), ("long", &["A", "B", "C"])]);
        let filtered = log.with_min_events(2);
        assert_eq!(filtered.case_count(), 1);
        assert_eq!(filtered.cases()[0].case_id, "long");
    }

    #[test]
    fn test_empty_log() {
        let log = EventLog::default();
        assert!(log.is_empty());
        assert!(log.cases().is_empty());
        assert!(log.activity_counts().is_empty());
    }
}
