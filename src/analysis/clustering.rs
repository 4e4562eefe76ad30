//! K-means grouping of students by behaviour.
//!
//! Features are standardized (zero mean, unit population variance) before
//! clustering. Initial centroids are chosen by farthest-point traversal
//! starting from the first case, so results are reproducible.

use serde::Serialize;

use crate::analysis::performance::CaseMetrics;
use crate::analysis::stats::{mean, population_std};
use crate::core::constants::defaults;
use crate::core::error::{EpmError, Result};

const MAX_ITERATIONS: usize = 300;

/// Features used for clustering, in column order
pub const FEATURES: [&str; 7] = [
    "total_duration_hours",
    "activity_diversity",
    "total_clicks",
    "total_keystrokes",
    "deeds_time_ratio",
    "study_time_ratio",
    "texteditor_time_ratio",
];

fn feature_vector(m: &CaseMetrics) -> [f64; 7] {
    [
        m.total_duration_hours,
        m.activity_diversity,
        m.total_clicks,
        m.total_keystrokes,
        m.deeds_time_ratio,
        m.study_time_ratio,
        m.texteditor_time_ratio,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub label: String,
    pub size: usize,
    pub avg_duration: f64,
    pub avg_events: f64,
    pub avg_diversity: f64,
    /// Mean of each feature over the cluster, in `FEATURES` order
    pub characteristics: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Clustering {
    pub n_clusters: usize,
    pub features_used: Vec<String>,
    pub clusters: Vec<ClusterSummary>,
    /// `(case_id, cluster index)`
    pub assignments: Vec<(String, usize)>,
}

/// Number of clusters for `n` cases: `min(5, n / 3)`.
pub fn cluster_count(n: usize) -> usize {
    defaults::MAX_CLUSTERS.min(n / 3)
}

fn standardize(rows: &[[f64; 7]]) -> Vec<[f64; 7]> {
    let mut scaled = rows.to_vec();
    for col in 0..FEATURES.len() {
        let values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        let m = mean(&values);
        let sd = population_std(&values);
        let sd = if sd > 0.0 { sd } else { 1.0 };
        for row in &mut scaled {
            row[col] = (row[col] - m) / sd;
        }
    }
    scaled
}

fn distance(a: &[f64; 7], b: &[f64; 7]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest(point: &[f64; 7], centroids: &[[f64; 7]]) -> usize {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, distance(point, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Lloyd's algorithm; returns the cluster index of every point.
pub fn kmeans(points: &[[f64; 7]], k: usize) -> Vec<usize> {
    if points.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = vec![points[0]];
    while centroids.len() < k.min(points.len()) {
        let next = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d = centroids
                    .iter()
                    .map(|c| distance(p, c))
                    .fold(f64::INFINITY, f64::min);
                (i, d)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        centroids.push(points[next]);
    }

    let mut assignments: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
    for _ in 0..MAX_ITERATIONS {
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&[f64; 7]> = points
                .iter()
                .zip(&assignments)
                .filter(|(_, a)| **a == c)
                .map(|(p, _)| p)
                .collect();
            if members.is_empty() {
                continue;
            }
            for (col, value) in centroid.iter_mut().enumerate() {
                *value = members.iter().map(|m| m[col]).sum::<f64>() / members.len() as f64;
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }
    assignments
}

impl Clustering {
    /// Cluster the cases; fails when fewer than two clusters are possible.
    pub fn compute(metrics: &[CaseMetrics]) -> Result<Self> {
        let k = cluster_count(metrics.len());
        if k < 2 {
            return Err(EpmError::Analysis(
                "Insufficient data for clustering".to_string(),
            ));
        }

        let raw: Vec<[f64; 7]> = metrics.iter().map(feature_vector).collect();
        let assignments = kmeans(&standardize(&raw), k);

        let clusters = (0..k)
            .map(|c| {
                let members: Vec<&CaseMetrics> = metrics
                    .iter()
                    .zip(&assignments)
                    .filter(|(_, a)| **a == c)
                    .map(|(m, _)| m)
                    .collect();
                let column = |f: &dyn Fn(&CaseMetrics) -> f64| {
                    mean(&members.iter().map(|m| f(*m)).collect::<Vec<f64>>())
                };
                ClusterSummary {
                    label: format!("Cluster_{c}"),
                    size: members.len(),
                    avg_duration: column(&|m| m.total_duration_hours),
                    avg_events: column(&|m| m.total_events as f64),
                    avg_diversity: column(&|m| m.activity_diversity),
                    characteristics: FEATURES
                        .iter()
                        .enumerate()
                        .map(|(i, name)| (name.to_string(), column(&|m| feature_vector(m)[i])))
                        .collect(),
                }
            })
            .collect();

        Ok(Self {
            n_clusters: k,
            features_used: FEATURES.iter().map(|f| f.to_string()).collect(),
            clusters,
            assignments: metrics
                .iter()
                .zip(assignments)
                .map(|(m, a)| (m.case_id.clone(), a))
                .collect(),
        })
    }
}
