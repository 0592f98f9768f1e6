use thiserror::Error;

/// Errors surfaced by the engine and the processing functions.
///
/// All of these are local to the requested operation: the target curve (and
/// the undo/redo stacks) are left untouched when one is returned.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("degenerate input for {operation}: {reason}")]
    DegenerateInput {
        operation: &'static str,
        reason: String,
    },

    #[error("no curve labelled {0:?} in the registry")]
    MissingCurve(String),

    #[error("a curve labelled {0:?} is already registered")]
    DuplicateLabel(String),

    #[error("manual peak table is empty")]
    EmptyTable,
}

impl EngineError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(operation: &'static str, reason: impl Into<String>) -> Self {
        EngineError::DegenerateInput {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
