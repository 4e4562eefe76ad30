//! Process map rendering
//!
//! Graphs are described as DOT and handed to the external Graphviz `dot`
//! binary. When `dot` is unavailable a plain-text listing is written instead.

pub mod dot;
pub mod graphviz;

pub use dot::Digraph;
pub use graphviz::{GraphvizRenderer, RenderOutcome, RenderedGraph, find_in_path};
