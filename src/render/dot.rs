//! Minimal DOT document model.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
struct Node {
    id: String,
    label: String,
    terminal: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Edge {
    from: String,
    to: String,
    label: String,
    width: f64,
}

/// A directed graph that can be written as DOT or as plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Digraph {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Digraph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_node(&mut self, id: &str, label: &str) {
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            terminal: false,
        });
    }

    /// Start or end marker, drawn as a small circle
    pub fn add_terminal(&mut self, id: &str, label: &str) {
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            terminal: true,
        });
    }

    pub fn add_edge(&mut self, from: &str, to: &str, label: &str, width: f64) {
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
            width,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.terminal).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", self.name);
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=\"rounded,filled\", fillcolor=\"#e8f1fb\", fontname=\"Helvetica\"];\n");
        out.push_str("    edge [fontname=\"Helvetica\", fontsize=10];\n");

        for node in &self.nodes {
            if node.terminal {
                let _ = writeln!(
                    out,
                    "    {} [label={}, shape=circle, fillcolor=\"#cccccc\"];",
                    quote(&node.id),
                    quote(&node.label)
                );
            } else {
                let _ = writeln!(out, "    {} [label={}];", quote(&node.id), quote(&node.label));
            }
        }
        for edge in &self.edges {
            let _ = writeln!(
                out,
                "    {} -> {} [label={}, penwidth={:.1}];",
                quote(&edge.from),
                quote(&edge.to),
                quote(&edge.label),
                edge.width
            );
        }
        out.push_str("}\n");
        out
    }

    /// Plain-text listing used when Graphviz is not available.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Graph: {}", self.name);
        let _ = writeln!(
            out,
            "Nodes: {}  Edges: {}",
            self.node_count(),
            self.edge_count()
        );
        out.push('\n');
        out.push_str("Nodes:\n");
        for node in self.nodes.iter().filter(|n| !n.terminal) {
            let _ = writeln!(out, "  {}", node.label);
        }
        out.push('\n');
        out.push_str("Edges:\n");
        for edge in &self.edges {
            let _ = writeln!(out, "  {} -> {} [{}]", edge.from, edge.to, edge.label);
        }
        out
    }
}
