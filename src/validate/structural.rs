//! Graph-level structural validation rules (V001–V006).

use std::collections::VecDeque;

use petgraph::algo::tarjan_scc;
use petgraph::visit::{Bfs, VisitMap, Visitable};

use crate::config::{CompileOptions, CyclePolicy, StartNodePolicy};
use crate::error::{Diagnostic, Phase, Severity};
use crate::parse::graph::WorkflowGraph;

/// Run all structural rules. Returns every problem found, errors and warnings mixed.
pub fn validate_structural(graph: &WorkflowGraph, options: &CompileOptions) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    v001_start_node_present(graph, &mut diagnostics);
    v002_start_node_policy(graph, options.start_nodes, &mut diagnostics);
    v003_start_node_no_incoming(graph, &mut diagnostics);
    v004_all_reachable_from_start(graph, &mut diagnostics);
    v005_cycles(graph, options.cycles, &mut diagnostics);
    v006_no_duplicate_edges(graph, &mut diagnostics);

    diagnostics
}

fn v001_start_node_present(graph: &WorkflowGraph, diagnostics: &mut Vec<Diagnostic>) {
    if graph.start_nodes().is_empty() {
        diagnostics.push(Diagnostic::error(
            Phase::Graph,
            "V001",
            "no start node: mark at least one task as the start node",
        ));
    }
}

fn v002_start_node_policy(
    graph: &WorkflowGraph,
    policy: StartNodePolicy,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if policy != StartNodePolicy::Single {
        return;
    }
    let starts = graph.start_nodes();
    let Some((first, extra)) = starts.split_first() else {
        return;
    };
    for node in extra {
        diagnostics.push(
            Diagnostic::error(
                Phase::Graph,
                "V002",
                format!(
                    "Task '{}' is a second start node; only '{}' may start this workflow",
                    node.id(),
                    first.id()
                ),
            )
            .at_node(node.id()),
        );
    }
}

fn v003_start_node_no_incoming(graph: &WorkflowGraph, diagnostics: &mut Vec<Diagnostic>) {
    for node in graph.start_nodes() {
        let sources = graph.predecessors(node.id());
        if !sources.is_empty() {
            diagnostics.push(
                Diagnostic::error(
                    Phase::Graph,
                    "V003",
                    format!(
                        "Start task '{}' must not have incoming edges (from {})",
                        node.id(),
                        quoted_list(&sources)
                    ),
                )
                .at_node(node.id()),
            );
        }
    }
}

fn v004_all_reachable_from_start(graph: &WorkflowGraph, diagnostics: &mut Vec<Diagnostic>) {
    // Multi-source frontier; with no start node every task stays undiscovered.
    let mut bfs = Bfs {
        stack: VecDeque::new(),
        discovered: graph.graph.visit_map(),
    };
    for idx in graph.graph.node_indices() {
        if graph.graph[idx].is_start() && bfs.discovered.visit(idx) {
            bfs.stack.push_back(idx);
        }
    }
    while bfs.next(&graph.graph).is_some() {}

    for idx in graph.graph.node_indices() {
        if !bfs.discovered.is_visited(&idx) {
            let node = &graph.graph[idx];
            diagnostics.push(
                Diagnostic::warning(
                    Phase::Graph,
                    "V004",
                    format!("Task '{}' is unreachable from any start node", node.id()),
                )
                .at_node(node.id()),
            );
        }
    }
}

fn v005_cycles(graph: &WorkflowGraph, policy: CyclePolicy, diagnostics: &mut Vec<Diagnostic>) {
    let severity = match policy {
        CyclePolicy::Allow => return,
        CyclePolicy::Warn => Severity::Warning,
        CyclePolicy::Reject => Severity::Error,
    };

    let mut cycles: Vec<Vec<_>> = tarjan_scc(&graph.graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.graph.contains_edge(scc[0], scc[0]))
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    cycles.sort();

    for scc in cycles {
        let ids: Vec<&str> = scc.iter().map(|&idx| graph.graph[idx].id()).collect();
        diagnostics.push(
            Diagnostic::error(
                Phase::Graph,
                "V005",
                format!("Tasks {} form a cycle", quoted_list(&ids)),
            )
            .with_severity(severity)
            .at_node(ids[0]),
        );
    }
}

fn v006_no_duplicate_edges(graph: &WorkflowGraph, diagnostics: &mut Vec<Diagnostic>) {
    for edge in &graph.duplicate_edges {
        diagnostics.push(
            Diagnostic::warning(
                Phase::Graph,
                "V006",
                format!(
                    "Duplicate edge '{}' from '{}' to '{}' is ignored",
                    edge.id, edge.source, edge.target
                ),
            )
            .at_node(edge.source.as_str()),
        );
    }
}

fn quoted_list(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| format!("'{}'", id))
        .collect::<Vec<_>>()
        .join(", ")
}
