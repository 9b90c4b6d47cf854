//! Building a [`CircuitProfile`] from a profile dump

use super::{CircuitProfile, NodeId, ProfileEdge, SimpleNode};
use crate::error::{ProfileError, Result};
use crate::measurement::Measurement;
use crate::schema::{JsonCircuitEdge, JsonCircuitNode, JsonProfile, JsonProfiles};

/// Label of the hold half of a split `Z1 (trace)` operator
pub const Z1_TRACE: &str = "Z1 (trace)";
/// Label of the output half of a split `Z1 (trace)` operator
pub const Z1_TRACE_OUTPUT: &str = "Z1 (trace) (output)";

/// True when an edge `source -> target` joins the output half of a split
/// operator to its hold half
///
/// The profile emits these edges against the data flow; assembly flips them
/// and tags them as back edges. Detection is by label substring only.
pub fn is_split_operator_pair(source_label: &str, target_label: &str) -> bool {
    source_label.contains(Z1_TRACE_OUTPUT) && target_label.contains(Z1_TRACE)
}

impl CircuitProfile {
    /// Assemble and fix up a profile
    ///
    /// # Errors
    ///
    /// Fails on edges or measurements referencing unknown nodes, malformed
    /// measurements, and split operators whose halves cannot be merged.
    pub fn from_json(json: &JsonProfiles) -> Result<Self> {
        let mut profile = Self::assemble(json)?;
        let merged = profile.merge_split_nodes()?;
        tracing::debug!(
            nodes = profile.node_count(),
            edges = profile.edges().len(),
            merged,
            "Circuit profile ready"
        );
        Ok(profile)
    }

    /// Parse and assemble a profile dump held in a string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json(&JsonProfiles::from_json_str(json)?)
    }

    /// Assemble nodes, edges and measurements without merging split operators
    pub fn assemble(json: &JsonProfiles) -> Result<Self> {
        let root = &json.graph.nodes;
        let mut profile = CircuitProfile::with_root(root.id.clone());

        // Children of the root cluster are top-level: no parent link
        for child in &root.nodes {
            profile.add_node(child, None);
        }
        for edge in &json.graph.edges {
            profile.add_edge(edge)?;
        }

        for (worker, worker_profile) in json.worker_profiles.iter().enumerate() {
            profile.attach_worker(worker, worker_profile)?;
        }
        profile.worker_count = json.worker_profiles.len();
        for node in profile.simple_nodes.values_mut() {
            node.measurements.pad_to(profile.worker_count);
        }

        tracing::debug!(
            leaves = profile.order.len(),
            clusters = profile.clusters.len(),
            edges = profile.edges.len(),
            workers = profile.worker_count,
            "Assembled circuit profile"
        );
        Ok(profile)
    }

    fn add_node(&mut self, node: &JsonCircuitNode, parent: Option<&NodeId>) {
        match node {
            JsonCircuitNode::Simple(simple) => {
                let previous = self
                    .simple_nodes
                    .insert(simple.id.clone(), SimpleNode::new(&simple.id, &simple.label));
                if previous.is_none() {
                    self.order.push(simple.id.clone());
                } else {
                    tracing::warn!("Duplicate node id {} in circuit graph", simple.id);
                }
                if let Some(p) = parent {
                    self.parents.insert(simple.id.clone(), p.clone());
                }
            }
            JsonCircuitNode::Cluster(cluster) => {
                if self.cluster_set.insert(cluster.id.clone()) {
                    self.clusters.push(cluster.id.clone());
                }
                for child in &cluster.nodes {
                    self.add_node(child, Some(&cluster.id));
                }
                if let Some(p) = parent {
                    self.parents.insert(cluster.id.clone(), p.clone());
                }
            }
        }
    }

    fn add_edge(&mut self, edge: &JsonCircuitEdge) -> Result<()> {
        for endpoint in [&edge.from_node, &edge.to_node] {
            if !self.simple_nodes.contains_key(endpoint) && !self.is_cluster(endpoint) {
                return Err(ProfileError::UnknownEdgeEndpoint {
                    from: edge.from_node.clone(),
                    to: edge.to_node.clone(),
                    missing: endpoint.clone(),
                });
            }
        }

        let split = match (self.node(&edge.from_node), self.node(&edge.to_node)) {
            (Some(source), Some(target)) => is_split_operator_pair(&source.label, &target.label),
            _ => false,
        };

        let profile_edge = if split {
            tracing::trace!(
                "Flipping split operator edge {} -> {}",
                edge.from_node,
                edge.to_node
            );
            ProfileEdge::new(&edge.to_node, &edge.from_node, true)
        } else {
            ProfileEdge::new(&edge.from_node, &edge.to_node, false)
        };
        self.edges.push(profile_edge);
        Ok(())
    }

    fn attach_worker(&mut self, worker: usize, json: &JsonProfile) -> Result<()> {
        for (node_id, entries) in &json.metadata {
            let mut decoded = Vec::with_capacity(entries.entries.len());
            for raw in &entries.entries {
                if let Some(m) = Measurement::decode(raw)? {
                    decoded.push(m);
                }
            }

            if let Some(node) = self.simple_nodes.get_mut(node_id) {
                for m in decoded {
                    node.add_measurement(m, worker);
                }
            } else if self.is_cluster(node_id) {
                tracing::trace!("Ignoring measurements for cluster {}", node_id);
            } else {
                return Err(ProfileError::UnknownNode(node_id.clone()));
            }
        }
        Ok(())
    }
}
