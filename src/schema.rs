//! Serialized input format for circuit profiles
//!
//! A profile dump holds one record per worker plus a single description of
//! the circuit graph:
//!
//! ```json
//! {
//!   "worker_profiles": [
//!     { "metadata": { "n3": { "entries": [["invocations", 5], ["time", {"secs": 0, "nanos": 1500000}]] } } }
//!   ],
//!   "graph": {
//!     "nodes": { "id": "n", "label": "circuit", "nodes": [
//!       { "Simple": { "id": "n3", "label": "map@query.sql:3" } },
//!       { "Cluster": { "id": "n4", "label": "join", "nodes": [] } }
//!     ] },
//!     "edges": [{ "from_node": "n3", "to_node": "n4" }]
//!   }
//! }
//! ```
//!
//! Graph nodes are an externally tagged union (`Simple` / `Cluster`), so the
//! variant is chosen from the tag, never from the shape of the payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw measurement: `[property, field0, field1, ...]`
pub type JsonMeasurement = Vec<serde_json::Value>;

/// Raw measurements for one node in one worker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonProfileEntries {
    pub entries: Vec<JsonMeasurement>,
}

/// Profile of a single worker: node id → measurements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonProfile {
    pub metadata: BTreeMap<String, JsonProfileEntries>,
}

/// A leaf operator in the circuit description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSimpleNode {
    pub id: String,
    pub label: String,
}

/// A grouping of nodes in the circuit description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCluster {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub nodes: Vec<JsonCircuitNode>,
}

/// Tagged union of leaf and cluster nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JsonCircuitNode {
    Simple(JsonSimpleNode),
    Cluster(JsonCluster),
}

/// A directed edge in the circuit description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCircuitEdge {
    pub from_node: String,
    pub to_node: String,
    #[serde(default)]
    pub from_cluster: bool,
    #[serde(default)]
    pub to_cluster: bool,
}

/// Circuit description: the root cluster and the edge list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonGraph {
    pub nodes: JsonCluster,
    #[serde(default)]
    pub edges: Vec<JsonCircuitEdge>,
}

/// Root of a profile dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonProfiles {
    pub worker_profiles: Vec<JsonProfile>,
    pub graph: JsonGraph,
}

impl JsonProfiles {
    /// Parse a profile dump from a JSON string
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "worker_profiles": [
            { "metadata": { "n1": { "entries": [["invocations", 3]] } } }
        ],
        "graph": {
            "nodes": { "id": "n", "label": "circuit", "nodes": [
                { "Simple": { "id": "n1", "label": "map" } },
                { "Cluster": { "id": "n2", "label": "region", "nodes": [
                    { "Simple": { "id": "n3", "label": "filter@q.sql:7" } }
                ] } }
            ] },
            "edges": [{ "from_node": "n1", "to_node": "n3", "from_cluster": false, "to_cluster": false }]
        }
    }"#;

    #[test]
    fn test_decode_tagged_nodes() {
        let profiles = JsonProfiles::from_json_str(SAMPLE).unwrap();
        assert_eq!(profiles.worker_profiles.len(), 1);
        assert_eq!(profiles.graph.nodes.nodes.len(), 2);

        match &profiles.graph.nodes.nodes[1] {
            JsonCircuitNode::Cluster(c) => {
                assert_eq!(c.id, "n2");
                assert!(matches!(c.nodes[0], JsonCircuitNode::Simple(_)));
            }
            other => panic!("expected cluster, got {:?}", other),
        }
    }

    #[test]
    fn test_edge_cluster_flags_default_false() {
        let edge: JsonCircuitEdge =
            serde_json::from_str(r#"{ "from_node": "a", "to_node": "b" }"#).unwrap();
        assert!(!edge.from_cluster);
        assert!(!edge.to_cluster);
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let bad = r#"{ "Region": { "id": "x", "label": "y" } }"#;
        let result: Result<JsonCircuitNode, _> = serde_json::from_str(bad);
        assert!(result.is_err());
    }
}
