//! JSON output format for display graphs
//!
//! The element list a graph renderer consumes:
//!
//! ```text
//! { "nodes": [ { id, value, label, parent?, attributes, hidden? } ],
//!   "edges": [ { source, target, back } ] }
//! ```

use crate::display::{Attributes, DisplayGraph, DisplayNode};
use crate::error::Result;
use serde::Serialize;

/// A node element
#[derive(Debug, Clone, Serialize)]
pub struct JsonNode {
    pub id: String,
    /// Colour position, 0–100
    pub value: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

/// An edge element
#[derive(Debug, Clone, Serialize)]
pub struct JsonEdge {
    pub source: String,
    pub target: String,
    pub back: bool,
}

/// Complete output document
#[derive(Debug, Clone, Serialize)]
pub struct JsonElements {
    pub nodes: Vec<JsonNode>,
    pub edges: Vec<JsonEdge>,
}

impl From<&DisplayNode> for JsonNode {
    fn from(node: &DisplayNode) -> Self {
        JsonNode {
            id: node.id().clone(),
            value: node.value(),
            label: node.label(),
            parent: node.parent().cloned(),
            attributes: node.attributes(),
            hidden: node.is_hidden(),
        }
    }
}

impl JsonElements {
    pub fn from_graph(graph: &DisplayGraph) -> Self {
        JsonElements {
            nodes: graph.nodes().iter().map(JsonNode::from).collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| JsonEdge {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    back: e.back,
                })
                .collect(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
