use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A change list carried an operation tag that no patcher understands.
    #[error("unknown change op kind: {0}")]
    UnknownChangeOpKind(String),

    #[error("malformed change op: {0}")]
    MalformedChangeOp(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
