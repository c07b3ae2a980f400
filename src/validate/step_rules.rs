//! Per-step validation.
//!
//! Every rule runs, so one call reports every problem on the step. Diagnostics
//! come back unlocated; the graph validator attaches task id and step index.

use crate::error::{Diagnostic, Phase};
use crate::parse::types::*;
use crate::template::{parse_template, unrecognized_tokens};

/// Validate one step against the agent that owns it. Returns all problems found.
pub fn validate_step(step: &Step, owner_agent: Option<&Agent>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    match step {
        Step::LlmInteract(s) => {
            match non_blank(s.prompt_template.as_deref()) {
                Some(prompt) => check_template(prompt, "prompt", &mut diagnostics),
                None => diagnostics.push(Diagnostic::error(
                    Phase::Step,
                    "S002",
                    "missing prompt: LLM step has no prompt template",
                )),
            }
            if non_blank(s.model.as_deref()).is_none() {
                diagnostics.push(Diagnostic::warning(
                    Phase::Step,
                    "S003",
                    "missing model: the default model will be used",
                ));
            }
        }
        Step::Tool(s) => {
            match owner_agent {
                None => diagnostics.push(Diagnostic::error(
                    Phase::Step,
                    "S004",
                    "task has no agent assigned: tool steps need an agent",
                )),
                Some(agent) => check_tool_membership(s.selected_tool(), agent, &mut diagnostics),
            }
            match non_blank(s.input_data_func.as_deref()) {
                Some(input) => check_template(input, "tool input", &mut diagnostics),
                None => diagnostics.push(Diagnostic::warning(
                    Phase::Step,
                    "S008",
                    "missing tool input: the tool will be called without input data",
                )),
            }
        }
        Step::UpdateMemory(s) => {
            if non_blank(s.memory_arg.as_deref()).is_none() {
                diagnostics.push(Diagnostic::error(
                    Phase::Step,
                    "S006",
                    "missing memory key: memory update has no key",
                ));
            }
        }
        Step::Unknown => {
            diagnostics.push(Diagnostic::error(
                Phase::Step,
                "S001",
                "unknown step type: expected llm_interact, tool or update_memory",
            ));
        }
    }

    diagnostics
}

fn check_tool_membership(tool: Option<&str>, agent: &Agent, diagnostics: &mut Vec<Diagnostic>) {
    if tool.is_some_and(|name| agent.tools.iter().any(|t| t == name)) {
        return;
    }
    let selected = match tool {
        Some(name) => format!("'{}'", name),
        None => "no tool selected".to_string(),
    };
    let suggestion = match agent.tools.first() {
        Some(first) => format!("; suggested: '{}'", first),
        None => format!("; agent '{}' has no tools", agent.name),
    };
    diagnostics.push(Diagnostic::error(
        Phase::Step,
        "S005",
        format!(
            "tool not available to agent: {} is not in agent '{}' tool set{}",
            selected, agent.name, suggestion
        ),
    ));
}

fn check_template(text: &str, field: &str, diagnostics: &mut Vec<Diagnostic>) {
    for token in unrecognized_tokens(&parse_template(text)) {
        diagnostics.push(Diagnostic::warning(
            Phase::Template,
            "T001",
            format!("unrecognized placeholder {} in {}; it will be sent as plain text", token, field),
        ));
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, tools: &[&str]) -> Agent {
        Agent {
            name: name.into(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn well_formed_llm_step() {
        let step = Step::LlmInteract(LlmInteractStep {
            prompt_template: Some("Hi {task_input}".into()),
            model: Some("m".into()),
        });
        assert!(validate_step(&step, None).is_empty());
    }

    #[test]
    fn llm_step_without_prompt_or_model() {
        let step = Step::LlmInteract(LlmInteractStep::default());
        let diagnostics = validate_step(&step, None);
        assert_eq!(codes(&diagnostics), vec!["S002", "S003"]);
        assert!(diagnostics[0].is_error());
        assert!(!diagnostics[1].is_error());
    }

    #[test]
    fn tool_step_reports_every_problem() {
        let step = Step::Tool(ToolStep {
            tool: Some("calculator".into()),
            ..ToolStep::default()
        });
        let diagnostics = validate_step(&step, Some(&agent("A1", &["search", "browse"])));
        assert_eq!(codes(&diagnostics), vec!["S005", "S008"]);
        assert!(diagnostics[0].message.starts_with("tool not available to agent"));
        assert!(diagnostics[0].message.contains("suggested: 'search'"));
    }

    #[test]
    fn tool_step_without_agent() {
        let step = Step::Tool(ToolStep {
            tool: Some("search".into()),
            input_data_func: Some("{task_input}".into()),
            ..ToolStep::default()
        });
        assert_eq!(codes(&validate_step(&step, None)), vec!["S004"]);
    }

    #[test]
    fn tool_name_overrides_tool() {
        let step = Step::Tool(ToolStep {
            tool: Some("calculator".into()),
            tool_name: Some("search".into()),
            input_data_func: Some("{task_input}".into()),
        });
        assert!(validate_step(&step, Some(&agent("A1", &["search"]))).is_empty());
    }

    #[test]
    fn memory_key_required() {
        let step = Step::UpdateMemory(UpdateMemoryStep {
            memory_arg: Some("  ".into()),
        });
        assert_eq!(codes(&validate_step(&step, None)), vec!["S006"]);
    }

    #[test]
    fn unknown_type() {
        assert_eq!(codes(&validate_step(&Step::Unknown, None)), vec!["S001"]);
    }

    #[test]
    fn template_typos_are_warnings() {
        let step = Step::LlmInteract(LlmInteractStep {
            prompt_template: Some("Answer {task_inptu}".into()),
            model: Some("m".into()),
        });
        let diagnostics = validate_step(&step, None);
        assert_eq!(codes(&diagnostics), vec!["T001"]);
        assert!(diagnostics[0].message.contains("{task_inptu}"));
    }
}
