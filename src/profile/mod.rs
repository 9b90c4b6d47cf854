//! Assembled circuit profiles
//!
//! A [`CircuitProfile`] is built once from a profile dump (see
//! [`crate::schema`]) and is read-only afterwards:
//!
//! ```text
//! JsonProfiles ──assemble()──▶ CircuitProfile ──merge_split_nodes()──▶ CircuitProfile
//!   (tree + edges + per-worker entries)         (hold halves folded into outputs)
//! ```
//!
//! [`CircuitProfile::from_json`] runs both steps. Leaf operators become
//! [`SimpleNode`]s carrying per-worker measurements; clusters are only
//! recorded by id and as parents.

mod assembly;
mod split;
mod threshold;

pub use assembly::{is_split_operator_pair, Z1_TRACE, Z1_TRACE_OUTPUT};

use crate::measurement::{Measurement, Measurements};
use crate::value::PropertyValue;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Identifier of a node, unique within one profile
pub type NodeId = String;

/// A profiled operator instance
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleNode {
    pub id: NodeId,
    /// Raw label, `operation[@source position]`
    pub label: String,
    pub operation: String,
    pub source_position: Option<String>,
    pub measurements: Measurements,
}

impl SimpleNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        let label = label.into();
        let mut parts = label.split('@');
        let operation = parts.next().unwrap_or_default().to_string();
        let source_position = parts.next().filter(|p| !p.is_empty()).map(str::to_string);

        Self {
            id: id.into(),
            label,
            operation,
            source_position,
            measurements: Measurements::new(),
        }
    }

    pub fn add_measurement(&mut self, m: Measurement, worker: usize) {
        self.measurements.add(worker, m);
    }

    /// Per-worker values for a property; empty when the node never reported it
    pub fn get_measurements(&self, property: &str) -> &[Option<PropertyValue>] {
        self.measurements.get(property)
    }
}

/// A directed edge between two profile nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Points against the data flow (split-operator fix-up)
    pub back: bool,
}

impl ProfileEdge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, back: bool) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            back,
        }
    }
}

/// Leaf nodes, clusters, parent links and edges of one profiled circuit
#[derive(Debug, Clone)]
pub struct CircuitProfile {
    simple_nodes: HashMap<NodeId, SimpleNode>,
    /// Leaf ids in assembly order
    order: Vec<NodeId>,
    clusters: Vec<NodeId>,
    cluster_set: HashSet<NodeId>,
    parents: HashMap<NodeId, NodeId>,
    edges: Vec<ProfileEdge>,
    root: NodeId,
    worker_count: usize,
}

impl CircuitProfile {
    fn with_root(root: NodeId) -> Self {
        Self {
            simple_nodes: HashMap::new(),
            order: Vec::new(),
            clusters: vec![root.clone()],
            cluster_set: HashSet::from([root.clone()]),
            parents: HashMap::new(),
            edges: Vec::new(),
            root,
            worker_count: 0,
        }
    }

    /// Leaf nodes in assembly order
    pub fn simple_nodes(&self) -> impl Iterator<Item = &SimpleNode> {
        self.order.iter().filter_map(|id| self.simple_nodes.get(id))
    }

    pub fn node(&self, id: &str) -> Option<&SimpleNode> {
        self.simple_nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.simple_nodes.len()
    }

    pub fn is_cluster(&self, id: &str) -> bool {
        self.cluster_set.contains(id)
    }

    /// Cluster ids in assembly order, root first
    pub fn clusters(&self) -> impl Iterator<Item = &NodeId> {
        self.clusters.iter()
    }

    /// Id of the implicit whole-graph cluster
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Immediate structural parent; `None` for top-level nodes
    pub fn parent(&self, id: &str) -> Option<&NodeId> {
        self.parents.get(id)
    }

    pub fn edges(&self) -> &[ProfileEdge] {
        &self.edges
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Worker ordinals `0..worker_count`
    pub fn worker_names(&self) -> Vec<usize> {
        (0..self.worker_count).collect()
    }

    /// Every property reported by at least one leaf, sorted
    pub fn metrics(&self) -> BTreeSet<String> {
        self.simple_nodes
            .values()
            .flat_map(|n| n.measurements.metrics())
            .map(str::to_string)
            .collect()
    }

    /// Total numeric mass of a property for one worker, summed over all leaves
    pub fn total_mass(&self, property: &str, worker: usize) -> f64 {
        self.simple_nodes
            .values()
            .map(|n| n.measurements.mass(property, worker))
            .sum()
    }
}
