//! Graph validation phase.
//!
//! Validates a built `WorkflowGraph` against the registries before compilation.

pub mod step_rules;
pub mod structural;

pub use step_rules::validate_step;

use tracing::debug;

use crate::config::CompileOptions;
use crate::error::{Diagnostic, Phase, ValidationReport};
use crate::parse::graph::WorkflowGraph;
use crate::parse::types::{Registry, RegistryIndex, Step, TaskNode};

/// Validate the entire workflow graph (structural + agent/tool references + steps).
///
/// Diagnostics are ordered by task creation order, then step order; graph-wide
/// problems that belong to no task come first.
pub fn validate_graph(
    graph: &WorkflowGraph,
    registry: &Registry,
    options: &CompileOptions,
) -> ValidationReport {
    let index = registry.index();
    let mut diagnostics = structural::validate_structural(graph, options);

    for node in graph.nodes() {
        diagnostics.extend(validate_task(node, &index));
    }

    diagnostics.sort_by_key(|d| {
        let node_rank = d
            .node_id
            .as_deref()
            .map_or(0, |id| graph.position_of(id).map_or(usize::MAX, |p| p + 1));
        let step_rank = d.step_index.map_or(0, |s| s + 1);
        (node_rank, step_rank)
    });

    let report = ValidationReport::from_diagnostics(diagnostics);
    debug!(
        ok = report.ok,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validated workflow graph"
    );
    report
}

/// Validate one task: its agent reference and every step it holds.
pub fn validate_task(node: &TaskNode, index: &RegistryIndex<'_>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let agent = match node.agent_name() {
        Some(name) => {
            let found = index.agent(name);
            if found.is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        Phase::Graph,
                        "R001",
                        format!("Task '{}' is assigned unknown agent '{}'", node.id(), name),
                    )
                    .at_node(node.id()),
                );
            }
            found
        }
        None => None,
    };

    for (i, step) in node.data.steps.iter().enumerate() {
        diagnostics.extend(
            validate_step(step, agent)
                .into_iter()
                .map(|d| d.at_step(node.id(), i)),
        );

        if let Step::Tool(tool_step) = step {
            if let Some(tool) = tool_step.selected_tool() {
                if index.tool(tool).is_none() {
                    diagnostics.push(
                        Diagnostic::error(
                            Phase::Step,
                            "S007",
                            format!("tool '{}' is not in the tool registry", tool),
                        )
                        .at_step(node.id(), i),
                    );
                }
            }
        }
    }

    diagnostics
}
