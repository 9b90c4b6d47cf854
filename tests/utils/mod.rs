// Integration test utilities
//
// Builders for profile dumps, so tests describe circuits instead of JSON.

#![allow(dead_code)]

use circuit_profiler::profile::CircuitProfile;
use circuit_profiler::selection::{CircuitSelection, NodeSubset, WorkerFilter};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Root cluster id used by every built profile
pub const ROOT: &str = "n";

/// Builds a profile dump with top-level leaves and one level of clusters
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    workers: usize,
    nodes: Vec<Value>,
    edges: Vec<Value>,
    // worker -> node -> entries
    metadata: BTreeMap<usize, BTreeMap<String, Vec<Value>>>,
}

impl ProfileBuilder {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn leaf(mut self, id: &str, label: &str) -> Self {
        self.nodes.push(json!({ "Simple": { "id": id, "label": label } }));
        self
    }

    pub fn cluster(mut self, id: &str, leaves: &[(&str, &str)]) -> Self {
        let children: Vec<Value> = leaves
            .iter()
            .map(|(id, label)| json!({ "Simple": { "id": id, "label": label } }))
            .collect();
        self.nodes
            .push(json!({ "Cluster": { "id": id, "label": "region", "nodes": children } }));
        self
    }

    pub fn edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push(json!({ "from_node": from, "to_node": to }));
        self
    }

    pub fn cluster_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .push(json!({ "from_node": from, "to_node": to, "to_cluster": true }));
        self
    }

    /// Raw entry `[property, field]` for one node and worker
    pub fn entry(mut self, worker: usize, node: &str, property: &str, field: Value) -> Self {
        self.metadata
            .entry(worker)
            .or_default()
            .entry(node.to_string())
            .or_default()
            .push(json!([property, field]));
        self
    }

    pub fn number(self, worker: usize, node: &str, property: &str, x: f64) -> Self {
        self.entry(worker, node, property, json!(x))
    }

    pub fn to_json(&self) -> String {
        let worker_profiles: Vec<Value> = (0..self.workers)
            .map(|w| {
                let metadata: serde_json::Map<String, Value> = self
                    .metadata
                    .get(&w)
                    .map(|nodes| {
                        nodes
                            .iter()
                            .map(|(id, entries)| (id.clone(), json!({ "entries": entries })))
                            .collect()
                    })
                    .unwrap_or_default();
                json!({ "metadata": metadata })
            })
            .collect();

        json!({
            "worker_profiles": worker_profiles,
            "graph": {
                "nodes": { "id": ROOT, "label": "circuit", "nodes": self.nodes },
                "edges": self.edges,
            }
        })
        .to_string()
    }

    pub fn build(&self) -> CircuitProfile {
        CircuitProfile::from_json_str(&self.to_json()).expect("valid profile")
    }
}

/// Selection showing only `visible`, all workers, hierarchy as given
pub fn select(profile: &CircuitProfile, metric: &str, visible: &[&str], hierarchy: bool) -> CircuitSelection {
    CircuitSelection {
        metric: metric.to_string(),
        workers_visible: WorkerFilter::All,
        nodes_visible: NodeSubset::Explicit {
            full: profile.simple_nodes().map(|n| n.id.clone()).collect(),
            selected: visible.iter().map(|s| s.to_string()).collect(),
        },
        hierarchy,
    }
}

/// Profile with a Z1 split pair, a cluster and three workers
pub fn sample_profile() -> ProfileBuilder {
    ProfileBuilder::new(3)
        .leaf("n1", "input@query.sql:1")
        .cluster(
            "n10",
            &[
                ("n2", "map@query.sql:4"),
                ("n3", "Z1 (trace)"),
                ("n4", "Z1 (trace) (output)"),
            ],
        )
        .leaf("n5", "filter")
        .leaf("n6", "output")
        .edge("n1", "n2")
        .edge("n2", "n3")
        .edge("n4", "n3")
        .edge("n4", "n5")
        .edge("n5", "n6")
        .cluster_edge("n6", "n10")
        .number(0, "n1", "invocations", 10.0)
        .number(1, "n1", "invocations", 12.0)
        .number(2, "n1", "invocations", 8.0)
        .number(0, "n2", "invocations", 400.0)
        .number(1, "n2", "invocations", 20.0)
        .number(0, "n3", "invocations", 5.0)
        .number(0, "n4", "invocations", 7.0)
        .number(2, "n4", "invocations", 1.0)
        .number(0, "n5", "invocations", 100.0)
        .number(1, "n6", "invocations", 3.0)
        .entry(0, "n2", "time", json!({ "secs": 1, "nanos": 500000000 }))
        .entry(0, "n5", "time", json!({ "secs": 0, "nanos": 2000000 }))
        .entry(0, "n2", "persistent_id", json!("map-17"))
        .entry(0, "n10", "invocations", json!(1000))
}
