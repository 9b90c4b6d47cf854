//! What the display should show: metric, workers, nodes and hierarchy
//!
//! A [`CircuitSelection`] is an immutable snapshot handed to the display
//! reduction. [`CircuitSelector`] holds the adjustable state behind it and
//! produces a fresh snapshot on every call to [`CircuitSelector::selection`].

use crate::config::ViewConfig;
use crate::error::{ProfileError, Result};
use crate::profile::{CircuitProfile, NodeId};
use std::collections::HashSet;

/// Metric used by [`CircuitSelection::full`]
pub const DEFAULT_METRIC: &str = "time";

/// Which worker indices are visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerFilter {
    All,
    /// One flag per worker; indices past the end are not visible
    Mask(Vec<bool>),
}

impl WorkerFilter {
    /// Only the listed workers out of `worker_count`; out-of-range indices are ignored
    pub fn only(worker_count: usize, workers: &[usize]) -> Self {
        let mut mask = vec![false; worker_count];
        for &w in workers {
            if let Some(slot) = mask.get_mut(w) {
                *slot = true;
            }
        }
        WorkerFilter::Mask(mask)
    }

    pub fn contains(&self, worker: usize) -> bool {
        match self {
            WorkerFilter::All => true,
            WorkerFilter::Mask(mask) => mask.get(worker).copied().unwrap_or(false),
        }
    }

    /// Elements of `data` at visible indices
    pub fn select<'a, T>(&'a self, data: &'a [T]) -> impl Iterator<Item = (usize, &'a T)> + 'a {
        data.iter().enumerate().filter(move |(i, _)| self.contains(*i))
    }
}

/// A subset of the profile's leaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSubset {
    /// Every node of the set
    Complete(HashSet<NodeId>),
    Explicit {
        full: HashSet<NodeId>,
        selected: HashSet<NodeId>,
    },
}

impl NodeSubset {
    pub fn full_set(&self) -> &HashSet<NodeId> {
        match self {
            NodeSubset::Complete(full) | NodeSubset::Explicit { full, .. } => full,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            NodeSubset::Complete(full) => full.contains(id),
            NodeSubset::Explicit { selected, .. } => selected.contains(id),
        }
    }

    /// Number of selected nodes
    pub fn len(&self) -> usize {
        match self {
            NodeSubset::Complete(full) => full.len(),
            NodeSubset::Explicit { selected, .. } => selected.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, NodeSubset::Complete(_))
    }
}

/// Input to the display reduction
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSelection {
    pub metric: String,
    pub workers_visible: WorkerFilter,
    pub nodes_visible: NodeSubset,
    pub hierarchy: bool,
}

impl CircuitSelection {
    /// Everything visible, coloured by `time`, with hierarchy
    pub fn full(profile: &CircuitProfile) -> Self {
        CircuitSelection {
            metric: DEFAULT_METRIC.to_string(),
            workers_visible: WorkerFilter::All,
            nodes_visible: NodeSubset::Complete(
                profile.simple_nodes().map(|n| n.id.clone()).collect(),
            ),
            hierarchy: true,
        }
    }
}

/// Adjustable selection state over one profile
#[derive(Debug, Clone)]
pub struct CircuitSelector<'a> {
    circuit: &'a CircuitProfile,
    worker_visible: Vec<bool>,
    metrics: Vec<String>,
    selected_metric: String,
    quantile: f64,
    hierarchy: bool,
}

impl<'a> CircuitSelector<'a> {
    /// Every worker visible, first metric selected, quantile 0, hierarchy on
    pub fn new(circuit: &'a CircuitProfile) -> Self {
        let metrics: Vec<String> = circuit.metrics().into_iter().collect();
        let selected_metric = metrics.first().cloned().unwrap_or_default();
        Self {
            circuit,
            worker_visible: vec![true; circuit.worker_count()],
            metrics,
            selected_metric,
            quantile: 0.0,
            hierarchy: true,
        }
    }

    /// Build a selector and apply a view configuration to it
    pub fn with_config(circuit: &'a CircuitProfile, config: &ViewConfig) -> Result<Self> {
        let mut selector = Self::new(circuit);
        selector.apply(config)?;
        Ok(selector)
    }

    /// Apply every setting of a view configuration
    ///
    /// # Errors
    ///
    /// Fails with `Config` when the configuration is invalid or names a
    /// metric the profile does not have.
    pub fn apply(&mut self, config: &ViewConfig) -> Result<()> {
        config.validate()?;
        if let Some(metric) = &config.metric {
            self.set_metric(metric)?;
        }
        self.set_quantile(config.quantile)?;
        if let Some(workers) = &config.workers {
            for visible in self.worker_visible.iter_mut() {
                *visible = false;
            }
            for &w in workers {
                self.set_worker_visible(w, true)?;
            }
        }
        self.set_hierarchy(config.hierarchy);
        Ok(())
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn metric(&self) -> &str {
        &self.selected_metric
    }

    pub fn set_metric(&mut self, metric: &str) -> Result<()> {
        if !self.metrics.iter().any(|m| m == metric) {
            return Err(ProfileError::Config(format!(
                "unknown metric '{metric}', expected one of: {}",
                self.metrics.join(", ")
            )));
        }
        self.selected_metric = metric.to_string();
        Ok(())
    }

    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    pub fn set_quantile(&mut self, quantile: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&quantile) {
            return Err(ProfileError::Config(format!(
                "quantile must be within 0..=100, got {quantile}"
            )));
        }
        self.quantile = quantile;
        Ok(())
    }

    pub fn worker_visible(&self, worker: usize) -> bool {
        self.worker_visible.get(worker).copied().unwrap_or(false)
    }

    pub fn set_worker_visible(&mut self, worker: usize, visible: bool) -> Result<()> {
        let count = self.worker_visible.len();
        let slot = self.worker_visible.get_mut(worker).ok_or_else(|| {
            ProfileError::Config(format!("worker {worker} out of range (0..{count})"))
        })?;
        *slot = visible;
        Ok(())
    }

    /// Flip every worker's visibility flag
    pub fn toggle_all_workers(&mut self) {
        for visible in self.worker_visible.iter_mut() {
            *visible = !*visible;
        }
    }

    pub fn hierarchy(&self) -> bool {
        self.hierarchy
    }

    pub fn set_hierarchy(&mut self, hierarchy: bool) {
        self.hierarchy = hierarchy;
    }

    /// Everything visible regardless of the current state
    pub fn full_selection(&self) -> CircuitSelection {
        CircuitSelection::full(self.circuit)
    }

    /// Snapshot of the current state; nodes are picked by threshold on the
    /// selected metric over the visible workers
    pub fn selection(&self) -> CircuitSelection {
        let workers = WorkerFilter::Mask(self.worker_visible.clone());
        let nodes =
            self.circuit
                .nodes_above_threshold(&self.selected_metric, &workers, self.quantile);
        CircuitSelection {
            metric: self.selected_metric.clone(),
            workers_visible: workers,
            nodes_visible: nodes,
            hierarchy: self.hierarchy,
        }
    }
}
