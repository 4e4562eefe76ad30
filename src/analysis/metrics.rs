use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::analysis::stats::mean;
use crate::dataset::EventLog;
use crate::discovery::collect_variants;

/// Number of cases active on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Throughput {
    pub date: NaiveDate,
    pub cases: usize,
}

/// Headline metrics shown by both dashboards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessMetrics {
    pub total_cases: usize,
    pub unique_activities: usize,
    pub total_events: usize,
    /// Mean case duration in days
    pub avg_case_duration: f64,
    pub variants: usize,
    /// Most frequent first
    pub activity_counts: Vec<(String, usize)>,
    /// Duration of each case in days
    pub case_durations: Vec<f64>,
    pub throughput: Vec<Throughput>,
}

impl ProcessMetrics {
    pub fn compute(log: &EventLog) -> Self {
        let cases = log.cases();
        let case_durations: Vec<f64> = cases
            .iter()
            .map(|c| c.span_seconds() / 86_400.0)
            .collect();

        // Inclusive day span of every case
        let spans: Vec<(NaiveDate, NaiveDate)> = cases
            .iter()
            .filter_map(|c| {
                let start = c.events.iter().map(|e| e.timestamp.date()).min()?;
                let end = c.events.iter().map(|e| e.timestamp.date()).max()?;
                Some((start, end))
            })
            .collect();
        let first = spans.iter().map(|s| s.0).min();
        let last = spans.iter().map(|s| s.1).max();

        let mut throughput = Vec::new();
        if let (Some(first), Some(last)) = (first, last) {
            let mut day = first;
            while day <= last {
                throughput.push(Throughput {
                    date: day,
                    cases: spans.iter().filter(|(s, e)| *s <= day && day <= *e).count(),
                });
                match day.checked_add_days(Days::new(1)) {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }

        Self {
            total_cases: cases.len(),
            unique_activities: log.activities().len(),
            total_events: log.len(),
            avg_case_duration: mean(&case_durations),
            variants: collect_variants(log).len(),
            activity_counts: log.activity_counts(),
            case_durations,
            throughput,
        }
    }
}
