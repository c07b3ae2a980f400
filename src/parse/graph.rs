//! petgraph-based directed graph wrapper for the task workflow.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use super::types::{TaskNode, WorkflowDocument, WorkflowEdge};
use crate::error::Diagnostic;

/// Immutable graph snapshot. Node indices follow creation order, so iterating
/// `graph.node_indices()` visits tasks in the order the editor created them.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    pub graph: DiGraph<TaskNode, WorkflowEdge>,
    pub node_indices: HashMap<String, NodeIndex>,
    /// Edges repeating an already-seen (source, target) pair. Not part of `graph`.
    pub duplicate_edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn build(document: &WorkflowDocument) -> Result<Self, Vec<Diagnostic>> {
        let mut graph = DiGraph::with_capacity(document.nodes.len(), document.edges.len());
        let mut node_indices = HashMap::new();
        let mut errors = Vec::new();

        for node in &document.nodes {
            if node_indices.contains_key(node.id()) {
                errors.push(
                    Diagnostic::parse("P003", format!("Duplicate task id '{}'", node.id()))
                        .at_node(node.id()),
                );
                continue;
            }
            let idx = graph.add_node(node.clone());
            node_indices.insert(node.id().to_string(), idx);
        }

        let mut seen_pairs = HashSet::new();
        let mut duplicate_edges = Vec::new();

        for edge in &document.edges {
            let source_idx = node_indices.get(&edge.source);
            let target_idx = node_indices.get(&edge.target);

            match (source_idx, target_idx) {
                (Some(&s), Some(&t)) => {
                    if seen_pairs.insert((s, t)) {
                        graph.add_edge(s, t, edge.clone());
                    } else {
                        duplicate_edges.push(edge.clone());
                    }
                }
                (None, _) => {
                    errors.push(Diagnostic::parse(
                        "P002",
                        format!(
                            "Edge '{}' references unknown source task '{}'",
                            edge.id, edge.source
                        ),
                    ));
                }
                (_, None) => {
                    errors.push(
                        Diagnostic::parse(
                            "P002",
                            format!(
                                "Edge '{}' references unknown target task '{}'",
                                edge.id, edge.target
                            ),
                        )
                        .at_node(edge.source.as_str()),
                    );
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            duplicates = duplicate_edges.len(),
            "built workflow graph"
        );

        Ok(WorkflowGraph {
            graph,
            node_indices,
            duplicate_edges,
        })
    }

    pub fn node(&self, node_id: &str) -> Option<&TaskNode> {
        self.node_indices.get(node_id).map(|&idx| &self.graph[idx])
    }

    /// Tasks in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Creation-order position of a task, used to order diagnostics.
    pub fn position_of(&self, node_id: &str) -> Option<usize> {
        self.node_indices.get(node_id).map(|idx| idx.index())
    }

    pub fn start_nodes(&self) -> Vec<&TaskNode> {
        self.nodes().filter(|n| n.is_start()).collect()
    }

    /// Kept edges in the order they were drawn.
    pub fn edges(&self) -> impl Iterator<Item = &WorkflowEdge> {
        self.graph.edge_indices().map(|idx| &self.graph[idx])
    }

    pub fn outgoing_edges(&self, node_id: &str) -> Vec<&WorkflowEdge> {
        self.edges_directed(node_id, Direction::Outgoing)
    }

    pub fn incoming_edges(&self, node_id: &str) -> Vec<&WorkflowEdge> {
        self.edges_directed(node_id, Direction::Incoming)
    }

    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.outgoing_edges(node_id)
            .into_iter()
            .map(|e| e.target.as_str())
            .collect()
    }

    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.incoming_edges(node_id)
            .into_iter()
            .map(|e| e.source.as_str())
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.incoming_edges(node_id).len()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.outgoing_edges(node_id).len()
    }

    fn edges_directed(&self, node_id: &str, direction: Direction) -> Vec<&WorkflowEdge> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| e.weight()).collect()
    }
}
