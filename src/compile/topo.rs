//! Topological sort of the workflow graph.

use petgraph::algo::toposort;
use tracing::debug;

use crate::parse::graph::WorkflowGraph;

/// Task ids in topological order, or `Err(task_id)` naming a task on a cycle.
pub fn topo_sort(graph: &WorkflowGraph) -> Result<Vec<String>, String> {
    match toposort(&graph.graph, None) {
        Ok(indices) => Ok(indices
            .into_iter()
            .map(|idx| graph.graph[idx].id().to_string())
            .collect()),
        Err(cycle) => {
            let id = graph.graph[cycle.node_id()].id().to_string();
            debug!(task = %id, "graph is cyclic, no execution order");
            Err(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{TaskData, TaskNode, WorkflowDocument, WorkflowEdge};

    fn doc(ids: &[&str], edges: &[(&str, &str)]) -> WorkflowDocument {
        WorkflowDocument {
            nodes: ids
                .iter()
                .map(|id| TaskNode {
                    id: id.to_string(),
                    node_type: None,
                    position: None,
                    data: TaskData::default(),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| WorkflowEdge {
                    id: format!("{s}-{t}"),
                    source: s.to_string(),
                    target: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn chain_is_ordered() {
        let graph = WorkflowGraph::build(&doc(&["c", "a", "b"], &[("a", "b"), ("b", "c")])).unwrap();
        assert_eq!(topo_sort(&graph).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn cycle_names_a_member() {
        let graph = WorkflowGraph::build(&doc(&["a", "b"], &[("a", "b"), ("b", "a")])).unwrap();
        let id = topo_sort(&graph).unwrap_err();
        assert!(id == "a" || id == "b");
    }
}
