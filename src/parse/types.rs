//! Rust types mirroring the canvas editor's node/edge state and the agent/tool registries.
//!
//! These types are the serde target for the JSON the editor hands over on "Build".
//! Rendering-only fields (`position`, the canvas node `type`) are carried but never inspected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Agent value the editor shows when no agent is selected.
pub const UNASSIGNED_AGENT: &str = "Unassigned";

// =============================================================================
// WORKFLOW DOCUMENT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub nodes: Vec<TaskNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub data: TaskData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    #[serde(default)]
    pub is_start_node: bool,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl TaskNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_start(&self) -> bool {
        self.data.is_start_node
    }

    /// The assigned agent name, treating empty and the editor's placeholder as unset.
    pub fn agent_name(&self) -> Option<&str> {
        self.data
            .agent
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != UNASSIGNED_AGENT)
    }
}

// =============================================================================
// STEPS — tagged union over the three executable step kinds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", try_from = "serde_json::Value")]
pub enum Step {
    #[serde(rename = "llm_interact")]
    LlmInteract(LlmInteractStep),
    #[serde(rename = "tool")]
    Tool(ToolStep),
    #[serde(rename = "update_memory")]
    UpdateMemory(UpdateMemoryStep),
    /// Missing, empty or unrecognized `type`; the edit form creates `{type: ""}` for new steps.
    Unknown,
}

/// Wire shape of a step whose `type` is a string.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum TaggedStep {
    #[serde(rename = "llm_interact")]
    LlmInteract(LlmInteractStep),
    #[serde(rename = "tool")]
    Tool(ToolStep),
    #[serde(rename = "update_memory")]
    UpdateMemory(UpdateMemoryStep),
    #[serde(other)]
    Unknown,
}

impl TryFrom<serde_json::Value> for Step {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        if !value.get("type").is_some_and(serde_json::Value::is_string) {
            return Ok(Step::Unknown);
        }
        Ok(match TaggedStep::deserialize(value)? {
            TaggedStep::LlmInteract(s) => Step::LlmInteract(s),
            TaggedStep::Tool(s) => Step::Tool(s),
            TaggedStep::UpdateMemory(s) => Step::UpdateMemory(s),
            TaggedStep::Unknown => Step::Unknown,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmInteractStep {
    #[serde(rename = "promptTemplate", default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStep {
    #[serde(default)]
    pub tool: Option<String>,
    /// Written by the edit form's tool selector; takes precedence over `tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub input_data_func: Option<String>,
}

impl ToolStep {
    pub fn selected_tool(&self) -> Option<&str> {
        non_empty(self.tool_name.as_deref()).or_else(|| non_empty(self.tool.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMemoryStep {
    #[serde(default)]
    pub memory_arg: Option<String>,
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Step::LlmInteract(_) => "llm_interact",
            Step::Tool(_) => "tool",
            Step::UpdateMemory(_) => "update_memory",
            Step::Unknown => "unknown",
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// REGISTRIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// A tool known to the registry. Accepts either a bare name or `{name, description}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ToolEntry")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToolEntry {
    Name(String),
    Descriptor {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<ToolEntry> for Tool {
    fn from(entry: ToolEntry) -> Self {
        match entry {
            ToolEntry::Name(name) => Tool {
                name,
                description: None,
            },
            ToolEntry::Descriptor { name, description } => Tool { name, description },
        }
    }
}

impl Tool {
    pub fn named(name: impl Into<String>) -> Self {
        Tool {
            name: name.into(),
            description: None,
        }
    }
}

/// Read-only snapshot of the agent and tool registries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

/// Name-keyed view over a `Registry`, built once per validation run.
pub struct RegistryIndex<'a> {
    agents: HashMap<&'a str, &'a Agent>,
    tools: HashMap<&'a str, &'a Tool>,
}

impl Registry {
    pub fn index(&self) -> RegistryIndex<'_> {
        RegistryIndex {
            agents: self.agents.iter().map(|a| (a.name.as_str(), a)).collect(),
            tools: self.tools.iter().map(|t| (t.name.as_str(), t)).collect(),
        }
    }
}

impl<'a> RegistryIndex<'a> {
    pub fn agent(&self, name: &str) -> Option<&'a Agent> {
        self.agents.get(name).copied()
    }

    pub fn tool(&self, name: &str) -> Option<&'a Tool> {
        self.tools.get(name).copied()
    }
}
