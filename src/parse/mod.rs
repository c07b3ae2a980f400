//! Parse phase: JSON → Rust types + graph construction.

pub mod graph;
pub mod types;

pub use graph::WorkflowGraph;
pub use types::*;

use serde::de::DeserializeOwned;

use crate::config::CompileOptions;
use crate::error::Diagnostic;

fn parse_json<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, Vec<Diagnostic>> {
    serde_json::from_str::<T>(json).map_err(|e| {
        vec![Diagnostic::parse(
            "P001",
            format!("Failed to parse {} JSON: {}", what, e),
        )]
    })
}

/// Deserialize the editor's `{nodes, edges}` state.
pub fn parse_workflow(json: &str) -> Result<WorkflowDocument, Vec<Diagnostic>> {
    parse_json(json, "workflow")
}

/// Deserialize the `{agents, tools}` registry snapshot.
pub fn parse_registry(json: &str) -> Result<Registry, Vec<Diagnostic>> {
    parse_json(json, "registry")
}

/// Deserialize compile options. Blank input means defaults.
pub fn parse_options(json: &str) -> Result<CompileOptions, Vec<Diagnostic>> {
    if json.trim().is_empty() {
        return Ok(CompileOptions::default());
    }
    parse_json(json, "options")
}

/// Parse JSON and build the graph in one step.
pub fn parse_and_build(json: &str) -> Result<WorkflowGraph, Vec<Diagnostic>> {
    let document = parse_workflow(json)?;
    WorkflowGraph::build(&document)
}
