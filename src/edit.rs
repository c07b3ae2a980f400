//! Editor-side lifecycle operations on a workflow document.
//!
//! These keep the document consistent the way the canvas does: the first task
//! becomes the start node, marking a start node drops its incoming edges, and
//! removing a task removes every edge touching it.

use tracing::debug;

use crate::error::Diagnostic;
use crate::parse::graph::WorkflowGraph;
use crate::parse::types::*;

/// Agent pre-selected on tasks dropped from the palette.
pub const DEFAULT_AGENT: &str = "Assistent";

/// A palette entry: label plus the steps a new task starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTemplate {
    pub label: &'static str,
    pub steps: Vec<Step>,
}

impl NodeTemplate {
    pub fn palette() -> Vec<NodeTemplate> {
        vec![
            NodeTemplate {
                label: "LLM Interact",
                steps: vec![llm(
                    "Respond to the following: {task_input}\n\nAct as a helpful assistant.",
                    "gpt-4o-mini",
                )],
            },
            NodeTemplate {
                label: "Update Memory",
                steps: vec![Step::UpdateMemory(UpdateMemoryStep {
                    memory_arg: Some("user_preference".into()),
                })],
            },
            NodeTemplate {
                label: "Math Calculation",
                steps: vec![Step::Tool(ToolStep {
                    tool: Some("calculator".into()),
                    tool_name: None,
                    input_data_func: Some(
                        r#"{"x": int(task_input), "y": 2, "operation": "add"}"#.into(),
                    ),
                })],
            },
            NodeTemplate {
                label: "Summarize Text",
                steps: vec![llm(
                    "Summarize the following text into a concise and clear summary:\n\n{task_input}.",
                    "gpt-4o",
                )],
            },
        ]
    }

    pub fn find(label: &str) -> Option<NodeTemplate> {
        Self::palette().into_iter().find(|t| t.label == label)
    }
}

fn llm(prompt: &str, model: &str) -> Step {
    Step::LlmInteract(LlmInteractStep {
        prompt_template: Some(prompt.into()),
        model: Some(model.into()),
    })
}

impl WorkflowDocument {
    /// Append a task built from `template`. It is the start node iff the document was empty.
    pub fn add_task(&mut self, template: &NodeTemplate, id: impl Into<String>) -> &TaskNode {
        let node = TaskNode {
            id: id.into(),
            node_type: Some("customNode".into()),
            position: None,
            data: TaskData {
                is_start_node: self.nodes.is_empty(),
                task_name: format!("{} Task", template.label),
                agent: Some(DEFAULT_AGENT.into()),
                steps: template.steps.clone(),
            },
        };
        debug!(task = %node.id, start = node.data.is_start_node, "added task");
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut TaskNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Toggle the start flag. Becoming a start node removes all incoming edges.
    /// Returns false if no task has this id.
    pub fn set_start_node(&mut self, id: &str, is_start: bool) -> bool {
        let Some(node) = self.task_mut(id) else {
            return false;
        };
        node.data.is_start_node = is_start;
        if is_start {
            let before = self.edges.len();
            self.edges.retain(|e| e.target != id);
            debug!(task = id, removed = before - self.edges.len(), "cleared incoming edges");
        }
        true
    }

    /// Remove a task and every edge touching it. Returns the removed task.
    pub fn remove_task(&mut self, id: &str) -> Option<TaskNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(pos);
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(node)
    }

    /// Connect two existing tasks. Returns false when an endpoint is missing or
    /// the ordered pair is already connected.
    pub fn connect(&mut self, source: &str, target: &str) -> bool {
        let known = |id: &str| self.nodes.iter().any(|n| n.id == id);
        if !known(source) || !known(target) {
            return false;
        }
        if self
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target)
        {
            return false;
        }
        self.edges.push(WorkflowEdge {
            id: format!("edge-{}-{}", source, target),
            source: source.into(),
            target: target.into(),
        });
        true
    }

    /// Freeze the current state into a graph for validation/compilation.
    pub fn snapshot_graph(&self) -> Result<WorkflowGraph, Vec<Diagnostic>> {
        WorkflowGraph::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(labels: &[&str]) -> WorkflowDocument {
        let mut doc = WorkflowDocument::default();
        for (i, label) in labels.iter().enumerate() {
            let template = NodeTemplate::find(label).unwrap();
            doc.add_task(&template, format!("dndnode_{i}"));
        }
        doc
    }

    #[test]
    fn only_first_task_starts() {
        let doc = doc_with(&["LLM Interact", "Update Memory"]);
        assert!(doc.nodes[0].data.is_start_node);
        assert!(!doc.nodes[1].data.is_start_node);
        assert_eq!(doc.nodes[1].data.task_name, "Update Memory Task");
        assert_eq!(doc.nodes[1].data.agent.as_deref(), Some(DEFAULT_AGENT));
    }

    #[test]
    fn marking_start_clears_incoming_edges() {
        let mut doc = doc_with(&["LLM Interact", "Summarize Text", "Update Memory"]);
        assert!(doc.connect("dndnode_0", "dndnode_1"));
        assert!(doc.connect("dndnode_1", "dndnode_2"));
        assert!(doc.set_start_node("dndnode_1", true));
        assert_eq!(doc.edges.len(), 1);
        assert_eq!(doc.edges[0].source, "dndnode_1");
        assert!(!doc.set_start_node("nope", true));
    }

    #[test]
    fn removing_task_cascades_edges() {
        let mut doc = doc_with(&["LLM Interact", "Summarize Text", "Update Memory"]);
        doc.connect("dndnode_0", "dndnode_1");
        doc.connect("dndnode_1", "dndnode_2");
        doc.connect("dndnode_0", "dndnode_2");
        let removed = doc.remove_task("dndnode_1").unwrap();
        assert_eq!(removed.id, "dndnode_1");
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.edges.len(), 1);
        assert!(doc.remove_task("dndnode_1").is_none());
    }

    #[test]
    fn connect_rejects_duplicates_and_unknown_ends() {
        let mut doc = doc_with(&["LLM Interact", "Summarize Text"]);
        assert!(doc.connect("dndnode_0", "dndnode_1"));
        assert!(!doc.connect("dndnode_0", "dndnode_1"));
        assert!(!doc.connect("dndnode_0", "ghost"));
        assert_eq!(doc.snapshot_graph().unwrap().outgoing_count("dndnode_0"), 1);
    }

    #[test]
    fn palette_has_four_templates() {
        let labels: Vec<_> = NodeTemplate::palette().iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            vec!["LLM Interact", "Update Memory", "Math Calculation", "Summarize Text"]
        );
    }
}
