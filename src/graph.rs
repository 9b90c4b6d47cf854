//! Generic directed graph with depth and reachability algorithms
//!
//! The graph mirrors the circuit topology for layout purposes and is stored
//! in a [`petgraph::graph::DiGraph`]. Edges carry a
//! weight (only used for depth) and a back-edge flag; back edges point
//! against the data flow and are skipped by the longest-path computation.
//!
//! # Depth
//!
//! ```text
//! depth(n) = max { depth(p) + weight(p, n) | p -> n forward edge }   (0 for sources)
//! ```
//!
//! followed by a repair pass: for every back edge `u -> v` with
//! `depth(u) > depth(v)`, `depth(v)` is raised to `depth(u)` so that a node
//! reached through a back edge never sits above the node pointing at it.
//!
//! The longest-path pass runs on an explicit work stack; graph size never
//! translates into call-stack depth.
//!
//! # Example
//!
//! ```
//! use circuit_profiler::graph::Graph;
//!
//! # fn main() -> circuit_profiler::error::Result<()> {
//! let mut g = Graph::new();
//! for n in ["a", "b", "c"] {
//!     g.add_node(n.to_string());
//! }
//! g.add_edge(&"a".to_string(), &"b".to_string(), 1, false)?;
//! g.add_edge(&"b".to_string(), &"c".to_string(), 1, false)?;
//!
//! let depth = g.depths();
//! assert_eq!(depth[&"c".to_string()], 2);
//! # Ok(())
//! # }
//! ```

use crate::error::{ProfileError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeFiltered, EdgeRef, Reversed};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

/// Edge payload: depth weight and back-edge flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub weight: u32,
    pub back: bool,
}

/// Directed graph over opaque node identities
///
/// Nodes keep their insertion order.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    inner: DiGraph<T, GraphEdge>,
    index: HashMap<T, NodeIndex>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            inner: DiGraph::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Graph<T>
where
    T: Clone + Eq + Hash + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; adding a node twice is a no-op
    pub fn add_node(&mut self, node: T) {
        if self.index.contains_key(&node) {
            return;
        }
        let ix = self.inner.add_node(node.clone());
        self.index.insert(node, ix);
    }

    /// Add an edge between two existing nodes
    ///
    /// # Errors
    ///
    /// Fails with `UnknownNode` if either endpoint has not been added.
    pub fn add_edge(&mut self, from: &T, to: &T, weight: u32, back: bool) -> Result<()> {
        let from_ix = self.position(from)?;
        let to_ix = self.position(to)?;
        self.inner.add_edge(from_ix, to_ix, GraphEdge { weight, back });
        Ok(())
    }

    fn position(&self, node: &T) -> Result<NodeIndex> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| ProfileError::UnknownNode(node.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains(&self, node: &T) -> bool {
        self.index.contains_key(node)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.inner.node_weights()
    }

    /// Longest-path depth of every node, with the back-edge repair applied
    ///
    /// A cycle made only of forward edges cannot be ordered; the edge that
    /// closes it is ignored and a warning is logged.
    pub fn depths(&self) -> HashMap<T, u32> {
        let g = &self.inner;
        let n = g.node_count();
        let mut depth: Vec<Option<u32>> = vec![None; n];
        let mut on_stack = vec![false; n];

        for start in g.node_indices() {
            if depth[start.index()].is_some() {
                continue;
            }

            // (node, next incoming edge to inspect)
            let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
            on_stack[start.index()] = true;

            while let Some(top) = stack.last_mut() {
                let (node, pos) = *top;
                let incoming: Vec<_> = g
                    .edges_directed(node, Direction::Incoming)
                    .filter(|e| !e.weight().back)
                    .collect();

                let mut next_pred = None;
                let mut i = pos;
                while i < incoming.len() {
                    let pred = incoming[i].source();
                    if depth[pred.index()].is_none() {
                        if on_stack[pred.index()] {
                            tracing::warn!(
                                "Forward cycle through {} -> {}; edge ignored for depth",
                                g[pred],
                                g[node]
                            );
                        } else {
                            next_pred = Some(pred);
                            break;
                        }
                    }
                    i += 1;
                }
                top.1 = i;

                match next_pred {
                    Some(pred) => {
                        on_stack[pred.index()] = true;
                        stack.push((pred, 0));
                    }
                    None => {
                        let d = incoming
                            .iter()
                            .filter_map(|e| depth[e.source().index()].map(|d| d + e.weight().weight))
                            .max()
                            .unwrap_or(0);
                        depth[node.index()] = Some(d);
                        on_stack[node.index()] = false;
                        stack.pop();
                    }
                }
            }
        }

        let mut depth: Vec<u32> = depth.into_iter().map(|d| d.unwrap_or(0)).collect();

        for e in g.edge_references().filter(|e| e.weight().back) {
            let (u, v) = (e.source().index(), e.target().index());
            if depth[u] > depth[v] {
                depth[v] = depth[u];
            }
        }

        g.node_weights().cloned().zip(depth).collect()
    }

    /// Nodes on some path starting at `node`, following edges that satisfy `predicate`
    ///
    /// The start node is always part of the result; an unknown node yields an
    /// empty set.
    pub fn reachable_from<P>(&self, node: &T, predicate: P) -> HashSet<T>
    where
        P: Fn(&GraphEdge) -> bool,
    {
        let Some(&start) = self.index.get(node) else {
            return HashSet::new();
        };
        let filtered = EdgeFiltered::from_fn(&self.inner, |e| predicate(e.weight()));
        let mut dfs = Dfs::new(&filtered, start);
        let mut result = HashSet::new();
        while let Some(ix) = dfs.next(&filtered) {
            result.insert(self.inner[ix].clone());
        }
        result
    }

    /// Nodes on some path ending at `node`, following edges that satisfy `predicate`
    ///
    /// The start node is always part of the result; an unknown node yields an
    /// empty set.
    pub fn can_reach<P>(&self, node: &T, predicate: P) -> HashSet<T>
    where
        P: Fn(&GraphEdge) -> bool,
    {
        let Some(&start) = self.index.get(node) else {
            return HashSet::new();
        };
        let filtered = EdgeFiltered::from_fn(Reversed(&self.inner), |e| predicate(e.weight()));
        let mut dfs = Dfs::new(&filtered, start);
        let mut result = HashSet::new();
        while let Some(ix) = dfs.next(&filtered) {
            result.insert(self.inner[ix].clone());
        }
        result
    }
}
