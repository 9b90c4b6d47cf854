//! Collapsing unselected leaves and re-projecting edges
//!
//! ```text
//! 1. mirror graph   leaves + edges not ending in a cluster
//!                   weight 0 between two hidden leaves, 1 otherwise
//! 2. partition      selected leaf   -> VisibleNode
//!                   unselected leaf -> HiddenNode of its depth
//! 3. regions        clusters parenting a VisibleNode (hierarchy only)
//! 4. edges          endpoints replaced by their representative
//! ```
//!
//! Zero-weight edges keep a chain of hidden leaves at one depth, so the chain
//! collapses into a single placeholder instead of one per step.

use super::{Attributes, DisplayEdge, DisplayGraph, DisplayNode, HiddenNode, RegionNode, VisibleNode};
use crate::error::{ProfileError, Result};
use crate::graph::Graph;
use crate::measurement::PERSISTENT_ID;
use crate::profile::{CircuitProfile, NodeId, SimpleNode, Z1_TRACE, Z1_TRACE_OUTPUT};
use crate::range::NumericRange;
use crate::selection::CircuitSelection;
use crate::value::PropertyValue;
use std::collections::{HashMap, HashSet};

impl DisplayGraph {
    /// Reduce a profile to the nodes and edges a selection asks for
    ///
    /// # Errors
    ///
    /// Fails with `Unresolved` when an edge starts at a node that is not a
    /// leaf, or references a leaf with no representative.
    ///
    /// # Example
    ///
    /// ```
    /// use circuit_profiler::display::DisplayGraph;
    /// use circuit_profiler::profile::CircuitProfile;
    /// use circuit_profiler::selection::CircuitSelection;
    ///
    /// # fn main() -> circuit_profiler::error::Result<()> {
    /// let profile = CircuitProfile::from_json_str(r#"{
    ///     "worker_profiles": [],
    ///     "graph": {
    ///         "nodes": { "id": "n", "label": "c", "nodes": [
    ///             { "Simple": { "id": "n1", "label": "input" } },
    ///             { "Simple": { "id": "n2", "label": "map" } }
    ///         ] },
    ///         "edges": [{ "from_node": "n1", "to_node": "n2" }]
    ///     }
    /// }"#)?;
    ///
    /// let display = DisplayGraph::from_profile(&profile, &CircuitSelection::full(&profile))?;
    /// assert_eq!(display.nodes().len(), 2);
    /// assert_eq!(display.nodes()[1].label(), "2 map");
    /// assert_eq!(display.edges().len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_profile(profile: &CircuitProfile, selection: &CircuitSelection) -> Result<Self> {
        let is_hidden = |id: &str| !selection.nodes_visible.contains(id);

        let mirror = mirror_graph(profile, &is_hidden)?;
        let depth = mirror.depths();
        let range = profile.property_range(&selection.metric);

        let mut nodes = Vec::with_capacity(profile.node_count());
        let mut placeholder_at: HashMap<u32, usize> = HashMap::new();
        let mut representative: HashMap<&str, NodeId> = HashMap::new();
        let mut visible_parents: HashSet<&NodeId> = HashSet::new();

        for node in profile.simple_nodes() {
            if is_hidden(&node.id) {
                let d = depth.get(&node.id).copied().unwrap_or(0);
                let ix = *placeholder_at.entry(d).or_insert_with(|| {
                    nodes.push(DisplayNode::Hidden(HiddenNode {
                        id: node.id.clone(),
                        depth: d,
                        members: Vec::new(),
                        parent: None,
                    }));
                    nodes.len() - 1
                });
                if let DisplayNode::Hidden(placeholder) = &mut nodes[ix] {
                    placeholder.members.push(node.id.clone());
                    representative.insert(&node.id, placeholder.id.clone());
                }
            } else {
                if let Some(parent) = profile.parent(&node.id) {
                    visible_parents.insert(parent);
                }
                representative.insert(&node.id, node.id.clone());
                nodes.push(DisplayNode::Visible(visible_node(
                    profile, node, selection, &range,
                )));
            }
        }

        if selection.hierarchy {
            for node in nodes.iter_mut() {
                if let DisplayNode::Hidden(placeholder) = node {
                    placeholder.parent = shared_parent(profile, &placeholder.members);
                }
            }
            for cluster in profile.clusters() {
                if cluster != profile.root() && visible_parents.contains(cluster) {
                    nodes.push(DisplayNode::Region(RegionNode {
                        id: cluster.clone(),
                        parent: profile.parent(cluster).cloned(),
                    }));
                }
            }
        }

        let mut edges = Vec::new();
        let mut emitted: HashSet<(NodeId, NodeId)> = HashSet::new();
        for edge in profile.edges() {
            if profile.is_cluster(&edge.target) {
                continue;
            }
            let resolve = |id: &NodeId| {
                representative
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| ProfileError::Unresolved(id.clone()))
            };
            let source = resolve(&edge.source)?;
            let target = resolve(&edge.target)?;

            if source == target {
                tracing::trace!("Edge {} -> {} folds into {}", edge.source, edge.target, source);
                continue;
            }
            let pair = (source, target);
            let through_placeholder = is_hidden(&edge.source) || is_hidden(&edge.target);
            if through_placeholder && emitted.contains(&pair) {
                continue;
            }
            let (source, target) = pair.clone();
            emitted.insert(pair);
            edges.push(DisplayEdge {
                source,
                target,
                back: edge.back,
            });
        }

        let graph = DisplayGraph {
            metric: selection.metric.clone(),
            hierarchy: selection.hierarchy,
            nodes,
            edges,
            property_ranges: profile.property_ranges(),
            mirror,
        };
        tracing::debug!(
            metric = %graph.metric,
            visible = graph.visible_nodes().count(),
            hidden = graph.hidden_nodes().count(),
            regions = graph.regions().count(),
            edges = graph.edges.len(),
            "Reduced circuit for display"
        );
        Ok(graph)
    }
}

fn mirror_graph<F>(profile: &CircuitProfile, is_hidden: &F) -> Result<Graph<NodeId>>
where
    F: Fn(&str) -> bool,
{
    let mut g = Graph::new();
    for node in profile.simple_nodes() {
        g.add_node(node.id.clone());
    }
    for edge in profile.edges() {
        if profile.is_cluster(&edge.target) {
            continue;
        }
        if !g.contains(&edge.source) {
            return Err(ProfileError::Unresolved(edge.source.clone()));
        }
        let weight = if is_hidden(&edge.source) && is_hidden(&edge.target) {
            0
        } else {
            1
        };
        g.add_edge(&edge.source, &edge.target, weight, edge.back)?;
    }
    Ok(g)
}

fn visible_node(
    profile: &CircuitProfile,
    node: &SimpleNode,
    selection: &CircuitSelection,
    range: &NumericRange,
) -> VisibleNode {
    let workers = &selection.workers_visible;
    let column_names = profile
        .worker_names()
        .into_iter()
        .filter(|&w| workers.contains(w))
        .map(|w| w.to_string())
        .collect();

    let mut attributes = Attributes::new(column_names);
    let mut persistent_id = None;
    for metric in node.measurements.metrics() {
        let values = node.get_measurements(metric);
        if metric == PERSISTENT_ID {
            persistent_id = values.iter().flatten().next().map(PropertyValue::string_value);
        }
        attributes.add_row(
            metric,
            workers
                .select(values)
                .filter_map(|(_, v)| v.as_ref())
                .map(ToString::to_string)
                .collect(),
        );
    }

    let value = if range.is_degenerate() {
        0.0
    } else {
        let max = node
            .measurements
            .numeric_values(&selection.metric, |w| workers.contains(w))
            .fold(0.0, f64::max);
        // A node without data can sit below the range minimum
        range.percents(max).clamp(0.0, 100.0)
    };

    let operation = if node.operation == Z1_TRACE_OUTPUT {
        Z1_TRACE.to_string()
    } else {
        node.operation.clone()
    };

    let structural_parent = profile.parent(&node.id);
    attributes.set("id", node.id.as_str());
    if let Some(pid) = &persistent_id {
        attributes.set("persistentId", pid.as_str());
    }
    if let Some(parent) = structural_parent {
        attributes.set("parent", parent.as_str());
    }
    attributes.set("operation", operation.as_str());

    VisibleNode {
        id: node.id.clone(),
        operation,
        value,
        parent: structural_parent.filter(|_| selection.hierarchy).cloned(),
        attributes,
        persistent_id,
    }
}

/// The one parent every member has, if they all have the same one
fn shared_parent(profile: &CircuitProfile, members: &[NodeId]) -> Option<NodeId> {
    let parents: HashSet<Option<&NodeId>> = members.iter().map(|m| profile.parent(m)).collect();
    if parents.len() == 1 {
        parents.into_iter().next().flatten().cloned()
    } else {
        None
    }
}
