//! Plain-text output format for display graphs
//!
//! A short summary followed by one line per node and per edge:
//!
//! ```text
//! metric: time
//! nodes: 3 visible, 1 hidden, 1 regions
//! edges: 4 (1 back)
//!
//! node n1     1 map              value=100.00  parent=n9
//! node n2     2 nodes            value=0.00    hidden
//! edge n1 -> n2
//! edge n3 -> n1 (back)
//! ```

use crate::display::{DisplayGraph, DisplayNode};

/// Node and edge counts of a display graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSummary {
    pub visible: usize,
    pub hidden: usize,
    pub regions: usize,
    pub edges: usize,
    pub back_edges: usize,
}

impl TextSummary {
    pub fn of(graph: &DisplayGraph) -> Self {
        TextSummary {
            visible: graph.visible_nodes().count(),
            hidden: graph.hidden_nodes().count(),
            regions: graph.regions().count(),
            edges: graph.edges().len(),
            back_edges: graph.edges().iter().filter(|e| e.back).count(),
        }
    }
}

fn format_node(node: &DisplayNode) -> String {
    let mut line = format!(
        "node {:<6} {:<18} value={:<7.2}",
        node.id(),
        node.label(),
        node.value()
    );
    if let Some(parent) = node.parent() {
        line.push_str(&format!("  parent={parent}"));
    }
    if node.is_hidden() {
        line.push_str("  hidden");
    }
    line.trim_end().to_string()
}

/// Render the whole graph as text
pub fn to_text(graph: &DisplayGraph) -> String {
    let summary = TextSummary::of(graph);
    let mut out = String::new();

    out.push_str(&format!("metric: {}\n", graph.metric()));
    out.push_str(&format!(
        "nodes: {} visible, {} hidden, {} regions\n",
        summary.visible, summary.hidden, summary.regions
    ));
    out.push_str(&format!("edges: {} ({} back)\n", summary.edges, summary.back_edges));
    out.push('\n');

    for node in graph.nodes() {
        out.push_str(&format_node(node));
        out.push('\n');
    }
    for edge in graph.edges() {
        out.push_str(&format!("edge {} -> {}", edge.source, edge.target));
        if edge.back {
            out.push_str(" (back)");
        }
        out.push('\n');
    }
    out
}
