//! Compile phase: validated `WorkflowGraph` → `CompiledWorkflow`.

pub mod topo;
pub mod types;

pub use types::*;

use tracing::{info, warn};

use crate::config::{CompileOptions, CyclePolicy};
use crate::error::{CompileError, InternalError, ValidationReport};
use crate::parse::graph::WorkflowGraph;
use crate::parse::types::{Registry, RegistryIndex, Step, TaskNode, WorkflowDocument};
use crate::validate::validate_graph;

/// Validate, then compile. No artifact is produced unless validation reports zero errors.
pub fn compile(
    graph: &WorkflowGraph,
    registry: &Registry,
    options: &CompileOptions,
) -> Result<CompiledWorkflow, CompileError> {
    let report = validate_graph(graph, registry, options);
    if !report.ok {
        warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "workflow failed validation"
        );
        return Err(CompileError::Invalid(report));
    }

    let execution_order = match topo::topo_sort(graph) {
        Ok(order) => Some(order),
        Err(task) if options.cycles == CyclePolicy::Reject => {
            return Err(InternalError::UnexpectedCycle(task).into());
        }
        Err(_) => None,
    };

    let index = registry.index();
    let tasks = graph
        .nodes()
        .map(|node| compile_task(node, graph, &index, options))
        .collect::<Result<Vec<_>, _>>()?;

    let edges = graph
        .edges()
        .map(|e| CompiledEdge {
            source: e.source.clone(),
            target: e.target.clone(),
        })
        .collect();

    let workflow = CompiledWorkflow::new(tasks, edges, execution_order, report.warnings);
    info!(
        tasks = workflow.tasks().len(),
        start_nodes = workflow.start_nodes().len(),
        warnings = workflow.warnings().len(),
        "compiled workflow"
    );
    Ok(workflow)
}

/// Build the graph from raw editor state, then compile.
/// Graph-build failures (dangling edges, duplicate ids) come back as an invalid report.
pub fn compile_document(
    document: &WorkflowDocument,
    registry: &Registry,
    options: &CompileOptions,
) -> Result<CompiledWorkflow, CompileError> {
    let graph = WorkflowGraph::build(document)
        .map_err(|errors| CompileError::Invalid(ValidationReport::from_diagnostics(errors)))?;
    compile(&graph, registry, options)
}

fn compile_task(
    node: &TaskNode,
    graph: &WorkflowGraph,
    index: &RegistryIndex<'_>,
    options: &CompileOptions,
) -> Result<CompiledTask, InternalError> {
    let agent = match node.agent_name() {
        Some(name) => Some(
            index
                .agent(name)
                .cloned()
                .ok_or_else(|| unresolved(node, format!("agent '{}'", name)))?,
        ),
        None => None,
    };

    let steps = node
        .data
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| compile_step(node, i, step, index, options))
        .collect::<Result<Vec<_>, _>>()?;

    let next = graph
        .successors(node.id())
        .into_iter()
        .map(|target| {
            graph
                .node(target)
                .map(|n| n.id().to_string())
                .ok_or_else(|| InternalError::MissingNode(target.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledTask::new(
        node.id().to_string(),
        node.data.task_name.clone(),
        node.is_start(),
        agent,
        steps,
        next,
    ))
}

fn compile_step(
    node: &TaskNode,
    i: usize,
    step: &Step,
    index: &RegistryIndex<'_>,
    options: &CompileOptions,
) -> Result<CompiledStep, InternalError> {
    match step {
        Step::LlmInteract(s) => {
            let prompt = s
                .prompt_template
                .as_deref()
                .ok_or_else(|| unresolved(node, format!("prompt in step {}", i)))?;
            let model = s
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .or_else(|| options.default_model.clone());
            Ok(CompiledStep::LlmInteract {
                prompt: CompiledTemplate::parse(prompt),
                model,
            })
        }
        Step::Tool(s) => {
            let tool = s
                .selected_tool()
                .and_then(|name| index.tool(name))
                .cloned()
                .ok_or_else(|| unresolved(node, format!("tool in step {}", i)))?;
            let input = s
                .input_data_func
                .as_deref()
                .filter(|input| !input.trim().is_empty())
                .map(CompiledTemplate::parse);
            Ok(CompiledStep::Tool { tool, input })
        }
        Step::UpdateMemory(s) => {
            let key = s
                .memory_arg
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| unresolved(node, format!("memory key in step {}", i)))?;
            Ok(CompiledStep::UpdateMemory {
                key: key.to_string(),
            })
        }
        Step::Unknown => Err(unresolved(node, format!("step type in step {}", i))),
    }
}

fn unresolved(node: &TaskNode, what: String) -> InternalError {
    InternalError::Unresolved {
        task: node.id().to_string(),
        what,
    }
}
