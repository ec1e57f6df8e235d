//! Error type for IR generation (§4.4).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("basic block `{0}` not found")]
    BlockNotFound(String),

    #[error("function `{0}` not found")]
    FunctionNotFound(String),

    #[error("invalid operand type: {0}")]
    InvalidOperandType(String),

    /// Raised for constructs the grammar and semantic analyzer accept but
    /// that code generation deliberately refuses to lower (`for` loops,
    /// non-builtin string operations). Fatal: the driver stops and reports
    /// it the same way it reports a semantic error.
    #[error("{0} is not supported by code generation")]
    NotImplemented(String),

    #[error("module verification failed: {0}")]
    VerificationFailed(String),

    #[error("failed to initialize code generation target: {0}")]
    TargetInitFailed(String),

    #[error("failed to emit object file: {0}")]
    ObjectEmitFailed(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
