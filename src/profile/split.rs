//! Folding split `Z1 (trace)` operators back into a single node
//!
//! The profiler reports one `Z1 (trace)` operator as two nodes: a hold node
//! and an output node. After assembly the pair is joined by a back edge
//! `hold -> output`. Merging:
//!
//! 1. adds the hold node's measurements into the output node, worker by worker
//! 2. deletes the hold node and its back edge
//! 3. redirects edges into the hold node to the output node, marking them as
//!    back edges; edges leaving the hold node now leave the output node
//!
//! Numeric mass is conserved: for every property and worker the sum over all
//! leaves is the same before and after.

use super::{CircuitProfile, NodeId, ProfileEdge};
use crate::error::{ProfileError, Result};
use std::collections::HashMap;

impl CircuitProfile {
    /// Merge every split operator pair; returns the number of removed hold nodes
    ///
    /// # Errors
    ///
    /// Fails if a hold node takes part in two back edges, or if its
    /// measurements cannot be merged into the output node.
    pub fn merge_split_nodes(&mut self) -> Result<usize> {
        let replace: HashMap<NodeId, NodeId> = self
            .edges
            .iter()
            .filter(|e| e.back)
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();

        let mut edges = Vec::with_capacity(self.edges.len());
        let mut removed = 0;

        for edge in std::mem::take(&mut self.edges) {
            if edge.back {
                let hold = self
                    .simple_nodes
                    .remove(&edge.source)
                    .ok_or_else(|| ProfileError::MissingSplitNode(edge.source.clone()))?;
                let output = self
                    .simple_nodes
                    .get_mut(&edge.target)
                    .ok_or_else(|| ProfileError::MissingSplitNode(edge.target.clone()))?;
                output.measurements.append(&hold.measurements)?;

                self.order.retain(|id| id != &edge.source);
                self.parents.remove(&edge.source);
                removed += 1;
                tracing::trace!("Merged split node {} into {}", edge.source, edge.target);
                continue;
            }

            let target = replace.get(&edge.target);
            let source = replace.get(&edge.source);
            if target.is_none() && source.is_none() {
                edges.push(edge);
                continue;
            }

            let redirected = ProfileEdge::new(
                source.cloned().unwrap_or(edge.source),
                target.cloned().unwrap_or(edge.target),
                edge.back || target.is_some(),
            );
            if redirected.source == redirected.target {
                tracing::trace!("Dropping self-loop on {} after merge", redirected.source);
                continue;
            }
            edges.push(redirected);
        }

        self.edges = edges;
        if removed > 0 {
            tracing::debug!(removed, "Merged split operator nodes");
        }
        Ok(removed)
    }
}
