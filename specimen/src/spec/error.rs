// Schema errors and diagnostics
// Shape errors found while building the spec tree, and the warnings/notices it emits

use super::nodule::{Location, NoduleKind};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemaErrorKind {
    /// The node is not a YAML mapping
    NotAMapping,
    /// `content` is not a sequence
    InvalidContent,
    /// Neither `content` nor `input` is present
    MissingContentAndInput,
    /// `flag` is not a string
    InvalidFlag,
    /// `name` is not a scalar
    InvalidName,
    /// `box` is not a string
    InvalidBox,
    /// `box` names a test function that was never registered
    UnregisteredBox,
    /// A leaf without any `box` in its ancestry
    MissingBox,
    /// `input` is not a mapping, or has a non-scalar key
    InvalidInput,
    /// `matrix` is not a mapping of scalar sequences
    InvalidMatrix,
    /// `matrix` on a node that has `content`
    MatrixOnNode,
    /// `content` where every child was dropped
    NoValidChildren,
}

/// Malformed spec node
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{nodule_kind} {name}({location}): {message}")]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub nodule_kind: NoduleKind,
    /// Node name, empty when the node has none
    pub name: String,
    pub location: Location,
    pub message: String,
}

impl SchemaError {
    /// Line reported when the failing subtree is dropped
    pub fn dropped_notice(&self) -> String {
        format!("{} -- this has been ignored", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Notice,
}

/// A warning or notice emitted while building the spec tree or
/// resolving focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Notice,
            message: message.into(),
        }
    }

    pub(crate) fn trace(&self) {
        tracing::warn!(severity = ?self.severity, "{}", self.message);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "Warning: {}", self.message),
            Severity::Notice => write!(f, "{}", self.message),
        }
    }
}
