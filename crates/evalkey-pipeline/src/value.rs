use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The working value of a pipeline run.
///
/// A run starts from the captured text and each successful transformer may
/// change both the content and the shape of the value (text to number,
/// number back to text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Value {
    /// The tag describing this value's own shape.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Text(_) => TypeTag::Text,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
        }
    }

    /// Whether this value satisfies a transformer's declared requirement.
    pub fn satisfies(&self, required: TypeTag) -> bool {
        match required {
            TypeTag::Number => matches!(self, Value::Int(_) | Value::Float(_)),
            tag => self.tag() == tag,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Capability tag gating a transformer.
///
/// Declared explicitly at registration; a transformer with no tag accepts
/// any value. [`TypeTag::Number`] accepts both integers and floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Text,
    Int,
    Float,
    Number,
}

/// Failure of a single transformer attempt.
///
/// Never fatal to a run: the dispatcher records it against the transformer
/// and moves on, and a later success of the same transformer supersedes it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum TransformError {
    /// Raised by the dispatcher's type gate, not by the transformer itself.
    #[error("not of required type {expected:?} (got {actual:?})")]
    TypeMismatch { expected: TypeTag, actual: TypeTag },
    /// Whatever the transformer reported, translated to a message at the
    /// boundary.
    #[error("{0}")]
    Failed(String),
}

impl TransformError {
    pub fn failed(message: impl fmt::Display) -> Self {
        TransformError::Failed(message.to_string())
    }
}

/// Fatal outcome of a run in which zero transformers succeeded.
///
/// Carries the original input and the final failure recorded for each
/// transformer that was attempted, for diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTransformersFailed {
    pub input: Value,
    pub failures: BTreeMap<String, TransformError>,
}

impl fmt::Display for AllTransformersFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "no transformer succeeded in processing the input: {:?}",
            self.input
        )?;
        write!(f, "errors they produced:")?;
        for (name, error) in &self.failures {
            write!(f, "\n    {name}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AllTransformersFailed {}
