use crate::line::LineError;
use serde::Serialize;
use thiserror::Error;

/// recoverable problem found while processing the input. none of these stop
/// the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error("line {line}: {error}: {text}")]
    Malformed {
        line: usize,
        text: String,
        #[serde(serialize_with = "serialize_display")]
        error: LineError,
    },

    #[error("line {line}: {count} field(s) before any register, dropped")]
    FieldsBeforeRegister { line: usize, count: usize },

    #[error("line {line}: register {register} at {address} already has fields, replacing them")]
    FieldSetOverwrite {
        line: usize,
        register: String,
        address: String,
    },

    #[error("line {line}: register not found, fields not attached: {error}")]
    RegisterNotFound {
        line: usize,
        #[serde(serialize_with = "serialize_display")]
        error: crate::registry::AttachError,
    },
}

impl Diagnostic {
    /// 1-based input line the diagnostic refers to
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::Malformed { line, .. }
            | Diagnostic::FieldsBeforeRegister { line, .. }
            | Diagnostic::FieldSetOverwrite { line, .. }
            | Diagnostic::RegisterNotFound { line, .. } => *line,
        }
    }
}

fn serialize_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
