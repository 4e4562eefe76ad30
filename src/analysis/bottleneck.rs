//! Bottleneck detection for the enhanced dashboard.
//!
//! Processing time of an activity is measured at the end of each run of
//! consecutive identical events, from the activity's first occurrence in the
//! case. Waiting time is the gap between the last event of a run and the
//! first event of the next one.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::analysis::stats::mean;
use crate::core::constants::panels;
use crate::dataset::EventLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BottleneckKind {
    Activity,
    Transition,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub element: String,
    pub kind: BottleneckKind,
    pub metric: &'static str,
    pub value_seconds: f64,
    pub value_formatted: String,
    pub occurrences: usize,
}

/// Human readable duration with one decimal.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1} seconds")
    } else if seconds < 3600.0 {
        format!("{:.1} minutes", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1} hours", seconds / 3600.0)
    } else {
        format!("{:.1} days", seconds / 86400.0)
    }
}

fn seconds_between(from: chrono::NaiveDateTime, to: chrono::NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

fn rank(
    samples: FxHashMap<String, Vec<f64>>,
    kind: BottleneckKind,
    metric: &'static str,
) -> Vec<Bottleneck> {
    let mut ranked: Vec<Bottleneck> = samples
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(element, values)| {
            let avg = mean(&values);
            Bottleneck {
                element,
                kind,
                metric,
                value_seconds: avg,
                value_formatted: format_duration(avg),
                occurrences: values.len(),
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.value_seconds
            .total_cmp(&a.value_seconds)
            .then_with(|| a.element.cmp(&b.element))
    });
    ranked.truncate(panels::TOP_BOTTLENECKS);
    ranked
}

/// Top activities by processing time followed by top transitions by waiting time.
///
/// An empty result is replaced by a single "No bottlenecks found" row.
pub fn detect_bottlenecks(log: &EventLog) -> Vec<Bottleneck> {
    let mut processing: FxHashMap<String, Vec<f64>> = FxHashMap::default();
    let mut waiting: FxHashMap<String, Vec<f64>> = FxHashMap::default();

    for case in log.cases() {
        let events = case.events;
        let mut first_seen: FxHashMap<&str, chrono::NaiveDateTime> = FxHashMap::default();

        for (i, event) in events.iter().enumerate() {
            let activity = event.activity.as_str();
            let next = events.get(i + 1);
            let run_ends = next.is_none_or(|n| n.activity != event.activity);

            if run_ends {
                if let Some(first) = first_seen.get(activity) {
                    processing
                        .entry(activity.to_string())
                        .or_default()
                        .push(seconds_between(*first, event.timestamp));
                }
                if let Some(next) = next {
                    waiting
                        .entry(format!("{activity} → {}", next.activity))
                        .or_default()
                        .push(seconds_between(event.timestamp, next.timestamp));
                }
            }
            first_seen.entry(activity).or_insert(event.timestamp);
        }
    }

    let mut bottlenecks = rank(processing, BottleneckKind::Activity, "Processing Time");
    bottlenecks.extend(rank(waiting, BottleneckKind::Transition, "Waiting Time"));

    if bottlenecks.is_empty() {
        bottlenecks.push(Bottleneck {
            element: "No bottlenecks found".to_string(),
            kind: BottleneckKind::None,
            metric: "None",
            value_seconds: 0.0,
            value_formatted: "0 seconds".to_string(),
            occurrences: 0,
        });
    }
    bottlenecks
}
