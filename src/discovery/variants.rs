use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::dataset::EventLog;

/// A distinct activity sequence and the number of cases following it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub activities: Vec<String>,
    pub count: usize,
}

impl Variant {
    /// Comma separated activity sequence
    pub fn label(&self) -> String {
        self.activities.join(",")
    }
}

/// Variant statistics of a log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariantAnalysis {
    pub total_variants: usize,
    /// Most frequent variants, limited to the requested number
    pub most_common: Vec<Variant>,
    /// Variant label to case count for the distribution chart
    pub distribution: Vec<(String, usize)>,
}

/// All variants, most frequent first; ties broken by sequence.
pub fn collect_variants(log: &EventLog) -> Vec<Variant> {
    let mut counts: FxHashMap<Vec<&str>, usize> = FxHashMap::default();
    for case in log.cases() {
        *counts.entry(case.trace()).or_default() += 1;
    }
    let mut variants: Vec<Variant> = counts
        .into_iter()
        .map(|(trace, count)| Variant {
            activities: trace.into_iter().map(str::to_string).collect(),
            count,
        })
        .collect();
    variants.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.activities.cmp(&b.activities))
    });
    variants
}

impl VariantAnalysis {
    pub fn compute(log: &EventLog, top: usize, distribution: usize) -> Self {
        let variants = collect_variants(log);
        Self {
            total_variants: variants.len(),
            distribution: variants
                .iter()
                .take(distribution)
                .map(|v| (v.label(), v.count))
                .collect(),
            most_common: variants.into_iter().take(top).collect(),
        }
    }
}

/// Session by activity count matrix for the most frequent activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionActivityMatrix {
    pub activities: Vec<String>,
    /// `(session, counts aligned with activities)`, ascending by session
    pub rows: Vec<(u32, Vec<usize>)>,
}

impl SessionActivityMatrix {
    pub fn compute(log: &EventLog, top_activities: usize) -> Self {
        let activities: Vec<String> = log
            .activity_counts()
            .into_iter()
            .take(top_activities)
            .map(|(name, _)| name)
            .collect();
        let column: FxHashMap<&str, usize> = activities
            .iter()
            .enumerate()
            .map(|(i, a)| (a.as_str(), i))
            .collect();

        let mut rows: Vec<(u32, Vec<usize>)> = Vec::new();
        for event in log.events() {
            let (Some(session), Some(&col)) = (event.session, column.get(event.activity.as_str()))
            else {
                continue;
            };
            let row = match rows.iter().position(|(s, _)| *s == session) {
                Some(i) => i,
                None => {
                    rows.push((session, vec![0; activities.len()]));
                    rows.len() - 1
                }
            };
            rows[row].1[col] += 1;
        }
        rows.sort_by_key(|(session, _)| *session);

        Self { activities, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
