//! circuit-profiler - Reduce dataflow circuit profiles for visual inspection
//!
//! This library decodes per-worker performance profiles of a dataflow
//! circuit, assembles the operator graph, folds split operators back
//! together, and reduces the graph to the nodes a selection asks for while
//! keeping every edge attached to something on screen.
//!
//! ```text
//! schema ─▶ measurement ─▶ profile ─▶ selection ─▶ display ─▶ json_output / text_output
//!            (value)                  (range)     (graph)
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod graph;
pub mod json_output;
pub mod measurement;
pub mod profile;
pub mod range;
pub mod schema;
pub mod selection;
pub mod text_output;
pub mod value;
