use serde::Serialize;

use crate::discovery::dfg::DirectlyFollowsGraph;
use crate::render::dot::Digraph;

/// A dependency relation kept by the heuristics miner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub source: String,
    pub target: String,
    /// Dependency measure in `(-1, 1)`
    pub value: f64,
    /// Directly-follows frequency of the pair
    pub frequency: usize,
}

/// Dependency graph produced by the heuristics miner.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HeuristicsNet {
    pub threshold: f64,
    pub activities: Vec<(String, usize)>,
    pub start_activities: Vec<(String, usize)>,
    pub end_activities: Vec<(String, usize)>,
    pub dependencies: Vec<Dependency>,
}

/// Dependency measure between two activities.
///
/// `(|a>b| - |b>a|) / (|a>b| + |b>a| + 1)` for distinct activities and
/// `|a>a| / (|a>a| + 1)` for self loops.
pub fn dependency_measure(dfg: &DirectlyFollowsGraph, a: &str, b: &str) -> f64 {
    let ab = dfg.count(a, b) as f64;
    if a == b {
        return ab / (ab + 1.0);
    }
    let ba = dfg.count(b, a) as f64;
    (ab - ba) / (ab + ba + 1.0)
}

impl HeuristicsNet {
    /// Keep every directly-follows pair whose dependency reaches `threshold`.
    pub fn discover(dfg: &DirectlyFollowsGraph, threshold: f64) -> Self {
        let mut dependencies: Vec<Dependency> = dfg
            .sorted_edges()
            .into_iter()
            .filter_map(|edge| {
                let value = dependency_measure(dfg, &edge.source, &edge.target);
                (value >= threshold).then_some(Dependency {
                    source: edge.source,
                    target: edge.target,
                    value,
                    frequency: edge.count,
                })
            })
            .collect();
        dependencies.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.target.cmp(&b.target))
        });

        Self {
            threshold,
            activities: dfg.activity_counts(),
            start_activities: dfg.start_activities(),
            end_activities: dfg.end_activities(),
            dependencies,
        }
    }

    pub fn to_digraph(&self) -> Digraph {
        let mut graph = Digraph::new("heuristics_net");
        graph.add_terminal("__start__", "start");
        graph.add_terminal("__end__", "end");
        for (activity, count) in &self.activities {
            graph.add_node(activity, &format!("{activity} ({count})"));
        }
        for (activity, count) in &self.start_activities {
            graph.add_edge("__start__", activity, &count.to_string(), 1.0);
        }
        for dep in &self.dependencies {
            let label = format!("{:.2} ({})", dep.value, dep.frequency);
            graph.add_edge(&dep.source, &dep.target, &label, 1.0 + 3.0 * dep.value);
        }
        for (activity, count) in &self.end_activities {
            graph.add_edge(activity, "__end__", &count.to_string(), 1.0);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::event_log::fixtures::log_from_traces;

    fn dfg() -> DirectlyFollowsGraph {
        DirectlyFollowsGraph::discover(&log_from_traces(&[
            ("c1", &["A", "B", "C"]),
            ("c2", &["A", "B", "C"]),
            ("c3", &["A", "C", "B"]),
            ("c4", &["D", "D", "D"]),
        ]))
    }

    #[test]
    fn test_dependency_measure() {
        let dfg = dfg();
        // A>B twice, B>A never
        assert!((dependency_measure(&dfg, "A", "B") - 2.0 / 3.0).abs() < 1e-9);
        // B>C twice, C>B once
        assert!((dependency_measure(&dfg, "B", "C") - 1.0 / 4.0).abs() < 1e-9);
        assert!((dependency_measure(&dfg, "C", "B") + 1.0 / 4.0).abs() < 1e-9);
        // D>D twice
        assert!((dependency_measure(&dfg, "D", "D") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_discover_applies_threshold() {
        let net = HeuristicsNet::discover(&dfg(), 0.5);
        let pairs: Vec<(&str, &str)> = net
            .dependencies
            .iter()
            .map(|d| (d.source.as_str(), d.target.as_str()))
            .collect();
        assert!(pairs.contains(&("A", "B")));
        assert!(pairs.contains(&("D", "D")));
        // A>C once, C>A never: exactly on the threshold
        assert!(pairs.contains(&("A", "C")));
        assert!(!pairs.contains(&("B", "C")));
        assert!(net.dependencies.iter().all(|d| d.value >= 0.5));
    }

    #[test]
    fn test_zero_threshold_keeps_positive_relations() {
        let net = HeuristicsNet::discover(&dfg(), 0.0);
        assert!(net.dependencies.iter().any(|d| d.source == "B" && d.target == "C"));
        assert!(!net.dependencies.iter().any(|d| d.source == "C" && d.target == "B"));
    }

    #[test]
    fn test_to_digraph() {
        let graph = HeuristicsNet::discover(&dfg(), 0.5).to_digraph();
        assert_eq!(graph.name(), "heuristics_net");
        assert_eq!(graph.node_count(), 4);
    }
}
