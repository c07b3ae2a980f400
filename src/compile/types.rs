//! Compiled workflow artifact handed to an execution backend.
//!
//! Same graph shape as the validated input, with agent and tool names resolved
//! to registry entries and every template pre-split into segments. Fields are
//! private: a compiled workflow is read, never edited.

use serde::{Deserialize, Serialize};

use crate::error::Diagnostic;
use crate::parse::types::{Agent, Tool};
use crate::template::{Segment, parse_template};

/// Output of [`compile`](crate::compile::compile); it cannot be built any other way.
///
/// ```compile_fail
/// let _: taskflow_compiler::compile::CompiledWorkflow = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledWorkflow {
    start_nodes: Vec<String>,
    tasks: Vec<CompiledTask>,
    edges: Vec<CompiledEdge>,
    /// Topological order of task ids; `None` when the graph has a cycle.
    execution_order: Option<Vec<String>>,
    /// Non-blocking diagnostics raised while validating.
    warnings: Vec<Diagnostic>,
}

impl CompiledWorkflow {
    pub(crate) fn new(
        tasks: Vec<CompiledTask>,
        edges: Vec<CompiledEdge>,
        execution_order: Option<Vec<String>>,
        warnings: Vec<Diagnostic>,
    ) -> Self {
        let start_nodes = tasks
            .iter()
            .filter(|t| t.is_start_node)
            .map(|t| t.id.clone())
            .collect();
        CompiledWorkflow {
            start_nodes,
            tasks,
            edges,
            execution_order,
            warnings,
        }
    }

    pub fn start_nodes(&self) -> &[String] {
        &self.start_nodes
    }

    /// Tasks in creation order.
    pub fn tasks(&self) -> &[CompiledTask] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&CompiledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn edges(&self) -> &[CompiledEdge] {
        &self.edges
    }

    pub fn execution_order(&self) -> Option<&[String]> {
        self.execution_order.as_deref()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTask {
    id: String,
    task_name: String,
    is_start_node: bool,
    agent: Option<Agent>,
    steps: Vec<CompiledStep>,
    /// Successor task ids in edge-creation order.
    next: Vec<String>,
}

impl CompiledTask {
    pub(crate) fn new(
        id: String,
        task_name: String,
        is_start_node: bool,
        agent: Option<Agent>,
        steps: Vec<CompiledStep>,
        next: Vec<String>,
    ) -> Self {
        CompiledTask {
            id,
            task_name,
            is_start_node,
            agent,
            steps,
            next,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn is_start_node(&self) -> bool {
        self.is_start_node
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn steps(&self) -> &[CompiledStep] {
        &self.steps
    }

    pub fn next(&self) -> &[String] {
        &self.next
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledEdge {
    pub source: String,
    pub target: String,
}

/// A template string together with its parsed segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTemplate {
    pub source: String,
    pub segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn parse(source: &str) -> Self {
        CompiledTemplate {
            source: source.to_string(),
            segments: parse_template(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CompiledStep {
    #[serde(rename = "llm_interact")]
    LlmInteract {
        prompt: CompiledTemplate,
        model: Option<String>,
    },
    #[serde(rename = "tool")]
    Tool {
        tool: Tool,
        input: Option<CompiledTemplate>,
    },
    #[serde(rename = "update_memory")]
    UpdateMemory { key: String },
}
