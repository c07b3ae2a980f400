use taskflow_compiler::parse::*;

// =============================================================================
// Registry builders
// =============================================================================

pub fn agent(name: &str, tools: &[&str]) -> Agent {
    Agent {
        name: name.into(),
        tools: tools.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn registry(agents: Vec<Agent>, tools: &[&str]) -> Registry {
    Registry {
        agents,
        tools: tools.iter().map(|t| Tool::named(*t)).collect(),
    }
}

/// One agent `A1` owning `search`, with `search` and `calculator` registered globally.
pub fn default_registry() -> Registry {
    registry(vec![agent("A1", &["search"])], &["search", "calculator"])
}

pub fn fixture_registry() -> Registry {
    parse_registry(include_str!("../fixtures/registry.json")).expect("registry fixture parses")
}

// =============================================================================
// Node / edge builders
// =============================================================================

pub fn task(id: &str, start: bool, agent: Option<&str>, steps: Vec<Step>) -> TaskNode {
    TaskNode {
        id: id.into(),
        node_type: Some("customNode".into()),
        position: None,
        data: TaskData {
            is_start_node: start,
            task_name: format!("{id} task"),
            agent: agent.map(String::from),
            steps,
        },
    }
}

pub fn bare(id: &str, start: bool) -> TaskNode {
    task(id, start, None, vec![])
}

pub fn edge(source: &str, target: &str) -> WorkflowEdge {
    WorkflowEdge {
        id: format!("e-{source}-{target}"),
        source: source.into(),
        target: target.into(),
    }
}

pub fn document(nodes: Vec<TaskNode>, edges: Vec<WorkflowEdge>) -> WorkflowDocument {
    WorkflowDocument { nodes, edges }
}

pub fn graph(nodes: Vec<TaskNode>, edges: Vec<WorkflowEdge>) -> WorkflowGraph {
    WorkflowGraph::build(&document(nodes, edges)).expect("graph builds")
}

// =============================================================================
// Step builders
// =============================================================================

pub fn llm_step(prompt: &str, model: Option<&str>) -> Step {
    Step::LlmInteract(LlmInteractStep {
        prompt_template: Some(prompt.into()),
        model: model.map(String::from),
    })
}

pub fn tool_step(tool: &str, input: &str) -> Step {
    Step::Tool(ToolStep {
        tool: Some(tool.into()),
        tool_name: None,
        input_data_func: Some(input.into()),
    })
}

pub fn memory_step(key: &str) -> Step {
    Step::UpdateMemory(UpdateMemoryStep {
        memory_arg: Some(key.into()),
    })
}
