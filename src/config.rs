//! Compile-time policy knobs. Every field has a default so an empty JSON object is valid.

use serde::{Deserialize, Serialize};

/// Model the editor pre-fills for new `llm_interact` steps.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StartNodePolicy {
    /// Any number (at least one) of entry points.
    #[default]
    Multiple,
    /// Exactly one entry point.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePolicy {
    Allow,
    #[default]
    Warn,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub start_nodes: StartNodePolicy,
    pub cycles: CyclePolicy,
    /// Recorded on compiled LLM steps that leave `model` unset.
    pub default_model: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            start_nodes: StartNodePolicy::default(),
            cycles: CyclePolicy::default(),
            default_model: Some(DEFAULT_MODEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let options: CompileOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CompileOptions::default());
        assert_eq!(options.default_model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn camel_case_fields() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"startNodes":"single","cycles":"reject","defaultModel":null}"#)
                .unwrap();
        assert_eq!(options.start_nodes, StartNodePolicy::Single);
        assert_eq!(options.cycles, CyclePolicy::Reject);
        assert_eq!(options.default_model, None);
    }
}
