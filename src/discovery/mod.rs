//! Process discovery
//!
//! This module builds the directly-follows graph, the heuristics dependency
//! graph and variant statistics from an event log.

pub mod dfg;
pub mod heuristics;
pub mod variants;

use serde::Serialize;

use crate::core::constants::defaults;
use crate::dataset::EventLog;

// Re-export commonly used items
pub use dfg::{DfgEdge, DirectlyFollowsGraph};
pub use heuristics::{Dependency, HeuristicsNet, dependency_measure};
pub use variants::{SessionActivityMatrix, Variant, VariantAnalysis, collect_variants};

/// Knobs for a discovery run.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryOptions {
    pub dependency_threshold: f64,
    pub top_variants: usize,
    pub variant_distribution: usize,
    pub top_activities: usize,
    pub heatmap_activities: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            dependency_threshold: defaults::DEPENDENCY_THRESHOLD,
            top_variants: defaults::TOP_VARIANTS,
            variant_distribution: defaults::VARIANT_DISTRIBUTION,
            top_activities: defaults::TOP_ACTIVITIES,
            heatmap_activities: defaults::HEATMAP_ACTIVITIES,
        }
    }
}

/// Everything discovery produces for one log.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResults {
    #[serde(skip)]
    pub dfg: DirectlyFollowsGraph,
    pub heuristics: HeuristicsNet,
    pub variants: VariantAnalysis,
    pub activity_frequency: Vec<(String, usize)>,
    pub session_matrix: SessionActivityMatrix,
}

impl DiscoveryResults {
    pub fn discover(log: &EventLog, options: &DiscoveryOptions) -> Self {
        let dfg = DirectlyFollowsGraph::discover(log);
        let heuristics = HeuristicsNet::discover(&dfg, options.dependency_threshold);
        let variants =
            VariantAnalysis::compute(log, options.top_variants, options.variant_distribution);
        let activity_frequency = log
            .activity_counts()
            .into_iter()
            .take(options.top_activities)
            .collect();
        let session_matrix = SessionActivityMatrix::compute(log, options.heatmap_activities);

        Self {
            dfg,
            heuristics,
            variants,
            activity_frequency,
            session_matrix,
        }
    }
}
