//! Diagnostics and error types shared by every phase.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Graph,
    Step,
    Template,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Graph => write!(f, "Graph"),
            Phase::Step => write!(f, "Step"),
            Phase::Template => write!(f, "Template"),
        }
    }
}

/// One validation problem, located by task id and step index where applicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub phase: Phase,
    pub node_id: Option<String>,
    pub step_index: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.phase, self.code, self.message)?;
        match (&self.node_id, self.step_index) {
            (Some(id), Some(step)) => write!(f, " (task '{}', step {})", id, step),
            (Some(id), None) => write!(f, " (task '{}')", id),
            _ => Ok(()),
        }
    }
}

impl Diagnostic {
    pub fn error(phase: Phase, code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code: code.into(),
            phase,
            node_id: None,
            step_index: None,
            message: message.into(),
        }
    }

    pub fn warning(phase: Phase, code: &str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(phase, code, message)
        }
    }

    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        Diagnostic::error(Phase::Parse, code, message)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn at_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn at_step(mut self, node_id: impl Into<String>, step_index: usize) -> Self {
        self.node_id = Some(node_id.into());
        self.step_index = Some(step_index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of graph validation. `ok` is true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Split a mixed diagnostic list by severity, preserving order.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            diagnostics.into_iter().partition(Diagnostic::is_error);
        ValidationReport {
            ok: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|d| d.code == code)
    }
}

/// Broken invariants inside the compiler itself. These are never caused by user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("task '{0}' is missing from the graph index")]
    MissingNode(String),

    #[error("execution order requested for a cyclic graph (cycle through '{0}')")]
    UnexpectedCycle(String),

    #[error("task '{task}' still references unresolved {what} after validation")]
    Unresolved { task: String, what: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("workflow is invalid: {} error(s), {} warning(s)", .0.errors.len(), .0.warnings.len())]
    Invalid(ValidationReport),

    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

impl CompileError {
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            CompileError::Invalid(report) => Some(report),
            CompileError::Internal(_) => None,
        }
    }
}
