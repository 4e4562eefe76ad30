use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::dataset::EventLog;
use crate::dataset::event_log::sort_counts;
use crate::render::dot::Digraph;

/// Directly-follows graph with start and end activity counts.
#[derive(Debug, Clone, Default)]
pub struct DirectlyFollowsGraph {
    edges: FxHashMap<(String, String), usize>,
    activities: FxHashMap<String, usize>,
    start_activities: FxHashMap<String, usize>,
    end_activities: FxHashMap<String, usize>,
}

/// One edge of a directly-follows graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DfgEdge {
    pub source: String,
    pub target: String,
    pub count: usize,
}

impl DirectlyFollowsGraph {
    pub fn discover(log: &EventLog) -> Self {
        let mut dfg = Self::default();
        for case in log.cases() {
            for event in case.events {
                *dfg.activities.entry(event.activity.clone()).or_default() += 1;
            }
            for (a, b) in case.transitions() {
                *dfg.edges
                    .entry((a.to_string(), b.to_string()))
                    .or_default() += 1;
            }
            if let (Some(first), Some(last)) = (case.events.first(), case.events.last()) {
                *dfg.start_activities.entry(first.activity.clone()).or_default() += 1;
                *dfg.end_activities.entry(last.activity.clone()).or_default() += 1;
            }
        }
        dfg
    }

    /// Number of times `b` directly follows `a`
    pub fn count(&self, a: &str, b: &str) -> usize {
        self.edges
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges by descending count, ties by source then target
    pub fn sorted_edges(&self) -> Vec<DfgEdge> {
        let mut edges: Vec<DfgEdge> = self
            .edges
            .iter()
            .map(|((source, target), count)| DfgEdge {
                source: source.clone(),
                target: target.clone(),
                count: *count,
            })
            .collect();
        edges.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.target.cmp(&b.target))
        });
        edges
    }

    pub fn activity_counts(&self) -> Vec<(String, usize)> {
        sort_counts(self.activities.iter().map(|(k, v)| (k, *v)))
    }

    pub fn start_activities(&self) -> Vec<(String, usize)> {
        sort_counts(self.start_activities.iter().map(|(k, v)| (k, *v)))
    }

    pub fn end_activities(&self) -> Vec<(String, usize)> {
        sort_counts(self.end_activities.iter().map(|(k, v)| (k, *v)))
    }

    /// Graph with synthetic start and end nodes, edge width scaled by frequency.
    pub fn to_digraph(&self) -> Digraph {
        let mut graph = Digraph::new("educational_process_dfg");
        graph.add_terminal("__start__", "start");
        graph.add_terminal("__end__", "end");

        for (activity, count) in self.activity_counts() {
            graph.add_node(&activity, &format!("{activity} ({count})"));
        }

        let max = self.edges.values().copied().max().unwrap_or(1) as f64;
        for (activity, count) in self.start_activities() {
            graph.add_edge("__start__", &activity, &count.to_string(), 1.0);
        }
        for edge in self.sorted_edges() {
            let width = 1.0 + 4.0 * edge.count as f64 / max;
            graph.add_edge(&edge.source, &edge.target, &edge.count.to_string(), width);
        }
        for (activity, count) in self.end_activities() {
            graph.add_edge(&activity, "__end__", &count.to_string(), 1.0);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::event_log::fixtures::log_from_traces;

    fn sample() -> DirectlyFollowsGraph {
        DirectlyFollowsGraph::discover(&log_from_traces(&[
            ("c1", &["A", "B", "C"]),
            ("c2", &["A", "B", "B", "C"]),
            ("c3", &["B", "C"]),
        ]))
    }

    #[test]
    fn test_dfg_counts() {
        let dfg = sample();
        assert_eq!(dfg.count("A", "B"), 2);
        assert_eq!(dfg.count("B", "C"), 3);
        assert_eq!(dfg.count("B", "B"), 1);
        assert_eq!(dfg.count("C", "A"), 0);
        assert_eq!(dfg.edge_count(), 3);
    }

    #[test]
    fn test_start_and_end_activities() {
        let dfg = sample();
        assert_eq!(
            dfg.start_activities(),
            vec![("A".to_string(), 2), ("B".to_string(), 1)]
        );
        assert_eq!(dfg.end_activities(), vec![("C".to_string(), 3)]);
    }

    #[test]
    fn test_sorted_edges() {
        let edges = sample().sorted_edges();
        assert_eq!(edges[0].source, "B");
        assert_eq!(edges[0].target, "C");
        assert_eq!(edges[0].count, 3);
        assert_eq!(edges[2].count, 1);
    }

    #[test]
    fn test_to_digraph_contains_all_edges() {
        let dot = sample().to_digraph().to_dot();
        assert!(dot.starts_with("digraph educational_process_dfg {"));
        assert!(dot.contains("\"B\" -> \"C\""));
        assert!(dot.contains("\"__start__\" -> \"A\""));
        assert!(dot.contains("\"C\" -> \"__end__\""));
    }

    #[test]
    fn test_empty_log() {
        let dfg = DirectlyFollowsGraph::discover(&EventLog::default());
        assert_eq!(dfg.edge_count(), 0);
        assert!(dfg.to_digraph().to_dot().contains("__start__"));
    }
}
