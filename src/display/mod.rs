//! Reduced, displayable view of a circuit profile
//!
//! A [`DisplayGraph`] is rebuilt from scratch for every [`CircuitSelection`]:
//!
//! ```text
//! CircuitProfile ─┐
//!                 ├─ DisplayGraph::from_profile() ─▶ nodes  (Visible | Hidden | Region)
//! Selection ──────┘                                  edges  (re-projected, deduplicated)
//! ```
//!
//! Selected leaves stay as [`VisibleNode`]s. Every other leaf is folded
//! into one [`HiddenNode`] per layout depth, so a thresholded view keeps the
//! rough shape of the circuit. With hierarchy enabled, clusters that contain
//! a visible node become [`RegionNode`]s.
//!
//! [`CircuitSelection`]: crate::selection::CircuitSelection

mod attributes;
mod reduce;

pub use attributes::{normalize_id, Attributes};

use crate::graph::Graph;
use crate::profile::NodeId;
use crate::range::NumericRange;
use std::collections::{BTreeMap, HashSet};

/// A leaf that passed the node selection
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleNode {
    pub id: NodeId,
    /// Operation as shown to the user
    pub operation: String,
    /// Colour position of the selected metric, 0–100
    pub value: f64,
    pub parent: Option<NodeId>,
    pub attributes: Attributes,
    pub persistent_id: Option<String>,
}

/// Placeholder for the unselected leaves sharing one depth
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenNode {
    /// Id of the first member
    pub id: NodeId,
    pub depth: u32,
    pub members: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Cluster wrapping visible nodes
#[derive(Debug, Clone, PartialEq)]
pub struct RegionNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayNode {
    Visible(VisibleNode),
    Hidden(HiddenNode),
    Region(RegionNode),
}

impl DisplayNode {
    pub fn id(&self) -> &NodeId {
        match self {
            DisplayNode::Visible(n) => &n.id,
            DisplayNode::Hidden(n) => &n.id,
            DisplayNode::Region(n) => &n.id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DisplayNode::Visible(n) => format!("{} {}", normalize_id(&n.id), n.operation),
            DisplayNode::Hidden(n) => format!("{} nodes", n.members.len()),
            DisplayNode::Region(n) => format!("{} region", normalize_id(&n.id)),
        }
    }

    /// Colour value; always 0 for placeholders and regions
    pub fn value(&self) -> f64 {
        match self {
            DisplayNode::Visible(n) => n.value,
            _ => 0.0,
        }
    }

    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            DisplayNode::Visible(n) => n.parent.as_ref(),
            DisplayNode::Hidden(n) => n.parent.as_ref(),
            DisplayNode::Region(n) => n.parent.as_ref(),
        }
    }

    pub fn attributes(&self) -> Attributes {
        match self {
            DisplayNode::Visible(n) => n.attributes.clone(),
            DisplayNode::Hidden(n) => {
                let mut attributes = Attributes::new(vec!["hidden".to_string()]);
                attributes.add_row(
                    "hidden nodes",
                    n.members
                        .iter()
                        .map(|m| normalize_id(m).to_string())
                        .collect(),
                );
                attributes
            }
            DisplayNode::Region(_) => Attributes::default(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, DisplayNode::Hidden(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub back: bool,
}

/// Nodes a hovered node feeds and is fed by, over forward edges only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub forward: HashSet<NodeId>,
    pub backward: HashSet<NodeId>,
}

/// Output of the display reduction
#[derive(Debug, Clone)]
pub struct DisplayGraph {
    metric: String,
    hierarchy: bool,
    nodes: Vec<DisplayNode>,
    edges: Vec<DisplayEdge>,
    property_ranges: BTreeMap<String, NumericRange>,
    /// Leaf-level topology the reduction was computed on
    mirror: Graph<NodeId>,
}

impl DisplayGraph {
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn hierarchy(&self) -> bool {
        self.hierarchy
    }

    /// Nodes in emission order: leaves and placeholders in profile order,
    /// then regions
    pub fn nodes(&self) -> &[DisplayNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[DisplayEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &VisibleNode> {
        self.nodes.iter().filter_map(|n| match n {
            DisplayNode::Visible(v) => Some(v),
            _ => None,
        })
    }

    pub fn hidden_nodes(&self) -> impl Iterator<Item = &HiddenNode> {
        self.nodes.iter().filter_map(|n| match n {
            DisplayNode::Hidden(h) => Some(h),
            _ => None,
        })
    }

    pub fn regions(&self) -> impl Iterator<Item = &RegionNode> {
        self.nodes.iter().filter_map(|n| match n {
            DisplayNode::Region(r) => Some(r),
            _ => None,
        })
    }

    pub fn property_ranges(&self) -> &BTreeMap<String, NumericRange> {
        &self.property_ranges
    }

    /// Shade of one attribute cell, 0–100
    ///
    /// `None` when the metric has no range to scale against or the cell is
    /// not numeric.
    pub fn cell_percent(&self, metric: &str, value: &str) -> Option<f64> {
        let range = self.property_ranges.get(metric)?;
        if range.is_degenerate() {
            return None;
        }
        let x: f64 = value.replace(',', "").parse().ok()?;
        Some(range.percents(x))
    }

    /// Forward and backward reachable leaves from `id`
    ///
    /// `id` is a leaf id; a placeholder answers for its first member.
    /// Unknown ids yield an empty highlight.
    pub fn highlight(&self, id: &str) -> Highlight {
        let id = id.to_string();
        if !self.mirror.contains(&id) {
            return Highlight::default();
        }
        Highlight {
            forward: self.mirror.reachable_from(&id, |e| !e.back),
            backward: self.mirror.can_reach(&id, |e| !e.back),
        }
    }
}
