//! Metric ranges and threshold-based node selection

use super::{CircuitProfile, NodeId};
use crate::range::NumericRange;
use crate::selection::{NodeSubset, WorkerFilter};
use std::collections::{BTreeMap, HashSet};

impl CircuitProfile {
    /// Range of a property's numeric values over every leaf and every worker
    pub fn property_range(&self, property: &str) -> NumericRange {
        self.simple_nodes().fold(NumericRange::empty(), |range, node| {
            range.union(&NumericRange::from_values(
                node.measurements.numeric_values(property, |_| true),
            ))
        })
    }

    /// [`property_range`](Self::property_range) for every metric in the profile
    pub fn property_ranges(&self) -> BTreeMap<String, NumericRange> {
        self.metrics()
            .into_iter()
            .map(|metric| {
                let range = self.property_range(&metric);
                (metric, range)
            })
            .collect()
    }

    /// Largest value of a property on one node, over the selected workers
    ///
    /// A node that reported nothing for the selected workers counts as 0.
    pub fn node_max(&self, id: &str, property: &str, workers: &WorkerFilter) -> f64 {
        self.node(id)
            .map(|node| {
                NumericRange::from_values(
                    node.measurements
                        .numeric_values(property, |w| workers.contains(w)),
                )
            })
            .filter(|range| !range.is_empty())
            .map_or(0.0, |range| range.max)
    }

    /// Leaves whose largest value for `property` reaches `percentage` of the
    /// global range
    ///
    /// The global range is taken over all workers; the per-node maximum only
    /// over `workers`. When the global range is empty or a single point
    /// there is nothing to rank by and every leaf is selected.
    ///
    /// # Example
    ///
    /// ```
    /// use circuit_profiler::profile::CircuitProfile;
    /// use circuit_profiler::selection::WorkerFilter;
    ///
    /// # fn main() -> circuit_profiler::error::Result<()> {
    /// let profile = CircuitProfile::from_json_str(r#"{
    ///     "worker_profiles": [{ "metadata": {
    ///         "a": { "entries": [["invocations", 10]] },
    ///         "b": { "entries": [["invocations", 90]] }
    ///     } }],
    ///     "graph": { "nodes": { "id": "n", "label": "c", "nodes": [
    ///         { "Simple": { "id": "a", "label": "map" } },
    ///         { "Simple": { "id": "b", "label": "filter" } }
    ///     ] } }
    /// }"#)?;
    ///
    /// let hot = profile.nodes_above_threshold("invocations", &WorkerFilter::All, 50.0);
    /// assert!(hot.contains("b"));
    /// assert!(!hot.contains("a"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn nodes_above_threshold(
        &self,
        property: &str,
        workers: &WorkerFilter,
        percentage: f64,
    ) -> NodeSubset {
        let full: HashSet<NodeId> = self.order.iter().cloned().collect();
        let range = self.property_range(property);
        if range.is_degenerate() {
            tracing::debug!(property, %range, "Degenerate range, selecting every node");
            return NodeSubset::Complete(full);
        }

        let threshold = range.quantile(percentage);
        let selected: HashSet<NodeId> = self
            .order
            .iter()
            .filter(|id| self.node_max(id, property, workers) >= threshold)
            .cloned()
            .collect();

        tracing::debug!(
            property,
            threshold,
            selected = selected.len(),
            total = full.len(),
            "Applied node threshold"
        );
        NodeSubset::Explicit { full, selected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(worker_entries: &[&str]) -> CircuitProfile {
        let workers: Vec<String> = worker_entries
            .iter()
            .map(|m| format!(r#"{{ "metadata": {{ {m} }} }}"#))
            .collect();
        let json = format!(
            r#"{{
                "worker_profiles": [{}],
                "graph": {{ "nodes": {{ "id": "n", "label": "c", "nodes": [
                    {{ "Simple": {{ "id": "a", "label": "map" }} }},
                    {{ "Simple": {{ "id": "b", "label": "filter" }} }},
                    {{ "Simple": {{ "id": "c", "label": "sink" }} }}
                ] }} }}
            }}"#,
            workers.join(",")
        );
        CircuitProfile::from_json_str(&json).unwrap()
    }

    #[test]
    fn test_property_range_spans_workers() {
        let p = profile(&[
            r#""a": { "entries": [["batches", 4]] }, "b": { "entries": [["batches", 1]] }"#,
            r#""a": { "entries": [["batches", 9]] }"#,
        ]);
        assert_eq!(p.property_range("batches"), NumericRange::new(1.0, 9.0));
        assert!(p.property_range("time").is_empty());

        let ranges = p.property_ranges();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges["batches"], NumericRange::new(1.0, 9.0));
    }

    #[test]
    fn test_text_values_have_no_range() {
        let p = profile(&[r#""a": { "entries": [["persistent_id", "x"]] }"#]);
        assert!(p.property_range("persistent_id").is_empty());
    }

    #[test]
    fn test_node_max_respects_worker_filter() {
        let p = profile(&[
            r#""a": { "entries": [["batches", 4]] }"#,
            r#""a": { "entries": [["batches", 9]] }"#,
        ]);
        assert_eq!(p.node_max("a", "batches", &WorkerFilter::All), 9.0);
        assert_eq!(p.node_max("a", "batches", &WorkerFilter::only(2, &[0])), 4.0);
        assert_eq!(p.node_max("b", "batches", &WorkerFilter::All), 0.0);
        assert_eq!(p.node_max("missing", "batches", &WorkerFilter::All), 0.0);
    }

    #[test]
    fn test_threshold_selects_hot_nodes() {
        let p = profile(&[
            r#""a": { "entries": [["invocations", 10]] }, "b": { "entries": [["invocations", 60]] }, "c": { "entries": [["invocations", 110]] }"#,
        ]);
        let s = p.nodes_above_threshold("invocations", &WorkerFilter::All, 50.0);
        assert!(!s.is_complete());
        assert!(!s.contains("a"));
        assert!(s.contains("b"));
        assert!(s.contains("c"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_zero_percent_keeps_every_measured_node() {
        let p = profile(&[
            r#""a": { "entries": [["invocations", 10]] }, "b": { "entries": [["invocations", 60]] }, "c": { "entries": [["invocations", 110]] }"#,
        ]);
        let s = p.nodes_above_threshold("invocations", &WorkerFilter::All, 0.0);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_degenerate_range_selects_all() {
        let p = profile(&[
            r#""a": { "entries": [["invocations", 5]] }, "b": { "entries": [["invocations", 5]] }"#,
        ]);
        let s = p.nodes_above_threshold("invocations", &WorkerFilter::All, 100.0);
        assert!(s.is_complete());
        assert_eq!(s.len(), 3);

        let s = p.nodes_above_threshold("time", &WorkerFilter::All, 100.0);
        assert!(s.is_complete());
    }
}
