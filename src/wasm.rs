//! WASM entry points for the browser editor.
//!
//! Every function takes JSON strings and returns a plain JS value; parse
//! failures come back as `P001` diagnostics rather than exceptions.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::compile::{CompiledWorkflow, compile};
use crate::config::CompileOptions;
use crate::error::{CompileError, Diagnostic, ValidationReport};
use crate::parse::types::{Agent, Registry, Step};
use crate::parse::{WorkflowGraph, parse_options, parse_registry, parse_workflow};

/// Validate a workflow: parse + graph build + graph validation.
/// Returns a `ValidationReport` object.
#[wasm_bindgen]
pub fn validate_workflow(workflow_json: &str, registry_json: &str, options_json: &str) -> JsValue {
    let report = validate_workflow_inner(workflow_json, registry_json, options_json);
    to_js(&report)
}

fn validate_workflow_inner(
    workflow_json: &str,
    registry_json: &str,
    options_json: &str,
) -> ValidationReport {
    let (graph, registry, options) = match load(workflow_json, registry_json, options_json) {
        Ok(inputs) => inputs,
        Err(errors) => return ValidationReport::from_diagnostics(errors),
    };
    crate::validate::validate_graph(&graph, &registry, &options)
}

/// Validate a single step JSON against its owning agent (`null` for none).
/// Returns an array of diagnostics.
#[wasm_bindgen]
pub fn validate_step(step_json: &str, agent_json: &str) -> JsValue {
    let diagnostics = validate_step_inner(step_json, agent_json);
    to_js(&diagnostics)
}

fn validate_step_inner(step_json: &str, agent_json: &str) -> Vec<Diagnostic> {
    let step = match serde_json::from_str::<Step>(step_json) {
        Ok(s) => s,
        Err(e) => return vec![Diagnostic::parse("P001", format!("Failed to parse step JSON: {}", e))],
    };
    let agent = match serde_json::from_str::<Option<Agent>>(agent_json) {
        Ok(a) => a,
        Err(e) => {
            return vec![Diagnostic::parse("P001", format!("Failed to parse agent JSON: {}", e))];
        }
    };
    crate::validate::validate_step(&step, agent.as_ref())
}

/// Full pipeline: parse → build graph → validate → compile.
/// Returns `{status: "success", workflow}` or `{status: "errors", report}`.
#[wasm_bindgen]
pub fn compile_workflow(workflow_json: &str, registry_json: &str, options_json: &str) -> JsValue {
    let result = compile_workflow_inner(workflow_json, registry_json, options_json);
    to_js(&result)
}

fn compile_workflow_inner(
    workflow_json: &str,
    registry_json: &str,
    options_json: &str,
) -> CompileResult {
    let (graph, registry, options) = match load(workflow_json, registry_json, options_json) {
        Ok(inputs) => inputs,
        Err(errors) => {
            return CompileResult::Errors {
                report: ValidationReport::from_diagnostics(errors),
            };
        }
    };

    match compile(&graph, &registry, &options) {
        Ok(workflow) => CompileResult::Success { workflow },
        Err(CompileError::Invalid(report)) => CompileResult::Errors { report },
        Err(CompileError::Internal(e)) => CompileResult::Internal {
            message: e.to_string(),
        },
    }
}

fn load(
    workflow_json: &str,
    registry_json: &str,
    options_json: &str,
) -> Result<(WorkflowGraph, Registry, CompileOptions), Vec<Diagnostic>> {
    let mut errors = Vec::new();
    let document = parse_workflow(workflow_json).map_err(|e| errors.extend(e)).ok();
    let registry = parse_registry(registry_json).map_err(|e| errors.extend(e)).ok();
    let options = parse_options(options_json).map_err(|e| errors.extend(e)).ok();

    match (document, registry, options) {
        (Some(document), Some(registry), Some(options)) => {
            let graph = WorkflowGraph::build(&document)?;
            Ok((graph, registry, options))
        }
        _ => Err(errors),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum CompileResult {
    Success { workflow: CompiledWorkflow },
    Errors { report: ValidationReport },
    Internal { message: String },
}
