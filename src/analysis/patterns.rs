use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::analysis::stats::median;
use crate::core::constants::panels;
use crate::dataset::EventLog;
use crate::dataset::event_log::sort_counts;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantShare {
    /// `Variant <n>` or `Other (<k> variants)`
    pub variant: String,
    pub count: usize,
    /// Comma separated activities, `Various` for the aggregate row
    pub activities: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceFrequency {
    pub sequence: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rework {
    pub activity: String,
    pub rework_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub case_id: String,
    pub variant: String,
    pub length: usize,
    pub reason: String,
}

/// Pattern panels of the enhanced dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PatternAnalysis {
    pub variant_distribution: Vec<VariantShare>,
    pub common_sequences: Vec<SequenceFrequency>,
    pub rework_patterns: Vec<Rework>,
    pub anomalies: Vec<Anomaly>,
}

impl PatternAnalysis {
    pub fn compute(log: &EventLog) -> Self {
        let cases = log.cases();

        // Activity sequence to case ids, ordered for deterministic ties
        let mut variants: BTreeMap<Vec<&str>, Vec<&str>> = BTreeMap::new();
        let mut bigrams: FxHashMap<String, usize> = FxHashMap::default();
        let mut rework: FxHashMap<&str, usize> = FxHashMap::default();

        for case in &cases {
            let trace = case.trace();

            for (a, b) in case.transitions() {
                *bigrams.entry(format!("{a} → {b}")).or_default() += 1;
            }

            let mut seen: FxHashSet<&str> = FxHashSet::default();
            for &activity in &trace {
                if !seen.insert(activity) {
                    *rework.entry(activity).or_default() += 1;
                }
            }

            variants.entry(trace).or_default().push(case.case_id);
        }

        let mut ranked: Vec<(&Vec<&str>, &Vec<&str>)> = variants.iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut variant_distribution: Vec<VariantShare> = ranked
            .iter()
            .take(panels::TOP_VARIANTS)
            .enumerate()
            .map(|(i, (trace, ids))| VariantShare {
                variant: format!("Variant {}", i + 1),
                count: ids.len(),
                activities: trace.join(","),
            })
            .collect();
        let rest = &ranked[ranked.len().min(panels::TOP_VARIANTS)..];
        let other_cases: usize = rest.iter().map(|(_, ids)| ids.len()).sum();
        if other_cases > 0 {
            variant_distribution.push(VariantShare {
                variant: format!("Other ({} variants)", rest.len()),
                count: other_cases,
                activities: "Various".to_string(),
            });
        }
        if variant_distribution.is_empty() {
            variant_distribution.push(VariantShare {
                variant: "No variants found".to_string(),
                count: 0,
                activities: "None".to_string(),
            });
        }

        let mut common_sequences: Vec<SequenceFrequency> = sort_counts(bigrams)
            .into_iter()
            .take(panels::TOP_BIGRAMS)
            .map(|(sequence, frequency)| SequenceFrequency {
                sequence,
                frequency,
            })
            .collect();
        if common_sequences.is_empty() {
            common_sequences.push(SequenceFrequency {
                sequence: "No sequences found".to_string(),
                frequency: 0,
            });
        }

        let mut rework_patterns: Vec<Rework> = sort_counts(rework)
            .into_iter()
            .map(|(activity, rework_count)| Rework {
                activity,
                rework_count,
            })
            .collect();
        if rework_patterns.is_empty() {
            rework_patterns.push(Rework {
                activity: "No Rework".to_string(),
                rework_count: 0,
            });
        }

        let lengths: Vec<f64> = cases.iter().map(|c| c.len() as f64).collect();
        let median_length = median(&lengths);
        let mut anomalies: Vec<Anomaly> = variants
            .iter()
            .filter(|(_, ids)| ids.len() == 1)
            .filter_map(|(trace, ids)| {
                let length = trace.len();
                ((length as f64 - median_length).abs() > panels::ANOMALY_LENGTH_DELTA as f64)
                    .then(|| Anomaly {
                        case_id: ids[0].to_string(),
                        variant: trace.join(","),
                        length,
                        reason: "Unusual length".to_string(),
                    })
            })
            .collect();
        if anomalies.is_empty() {
            anomalies.push(Anomaly {
                case_id: "None".to_string(),
                variant: "None".to_string(),
                length: 0,
                reason: "No anomalies found".to_string(),
            });
        }

        Self {
            variant_distribution,
            common_sequences,
            rework_patterns,
            anomalies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::event_log::fixtures::log_from_traces;

    #[test]
    fn test_variant_distribution_with_other() {
        let log = log_from_traces(&[
            ("c1", &["A", "B"]),
            ("c2", &["A", "B"]),
            ("c3", &["A"]),
            ("c4", &["B"]),
            ("c5", &["C"]),
            ("c6", &["D"]),
            ("c7", &["E"]),
            ("c8", &["F"]),
        ]);
        let patterns = PatternAnalysis::compute(&log);
        let dist = &patterns.variant_distribution;
        assert_eq!(dist.len(), 6);
        assert_eq!(dist[0].variant, "Variant 1");
        assert_eq!(dist[0].activities, "A,B");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[5].variant, "Other (2 variants)");
        assert_eq!(dist[5].count, 2);
        assert_eq!(dist[5].activities, "Various");
    }

    #[test]
    fn test_bigrams_and_rework() {
        let log = log_from_traces(&[("c1", &["A", "B", "A", "B"]), ("c2", &["A", "B"])]);
        let patterns = PatternAnalysis::compute(&log);
        assert_eq!(
            patterns.common_sequences[0],
            SequenceFrequency {
                sequence: "A → B".to_string(),
                frequency: 3
            }
        );
        assert_eq!(patterns.rework_patterns.len(), 2);
        assert!(patterns.rework_patterns.iter().all(|r| r.rework_count == 1));
    }

    #[test]
    fn test_anomalies_by_length() {
        let log = log_from_traces(&[
            ("c1", &["A", "B"]),
            ("c2", &["A", "B"]),
            ("c3", &["A", "B"]),
            ("long", &["A", "B", "C", "D", "E", "F", "G"]),
        ]);
        let patterns = PatternAnalysis::compute(&log);
        assert_eq!(patterns.anomalies.len(), 1);
        assert_eq!(patterns.anomalies[0].case_id, "long");
        assert_eq!(patterns.anomalies[0].length, 7);
        assert_eq!(patterns.anomalies[0].reason, "Unusual length");
    }

    #[test]
    fn test_activity_names_with_commas() {
        let log = log_from_traces(&[
            ("c1", &["A", "B"]),
            ("c2", &["A, B"]),
            ("c3", &["A", "B"]),
            ("c4", &["Deeds,Es,1,1,2,3,4"]),
        ]);
        let patterns = PatternAnalysis::compute(&log);
        let dist = &patterns.variant_distribution;
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[0].activities, "A,B");
        assert_eq!(dist[0].count, 2);
        assert!(dist.iter().any(|v| v.activities == "A, B" && v.count == 1));

        // One-activity traces sit next to the median of 2
        assert_eq!(patterns.anomalies[0].reason, "No anomalies found");
    }

    #[test]
    fn test_placeholders_on_empty_log() {
        let patterns = PatternAnalysis::compute(&EventLog::default());
        assert_eq!(patterns.variant_distribution[0].variant, "No variants found");
        assert_eq!(patterns.common_sequences[0].sequence, "No sequences found");
        assert_eq!(patterns.rework_patterns[0].activity, "No Rework");
        assert_eq!(patterns.anomalies[0].reason, "No anomalies found");
    }
}
