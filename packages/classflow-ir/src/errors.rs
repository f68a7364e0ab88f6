//! Error types for classflow-ir
//!
//! Analysis imprecision is never an error; these cover the cases where the
//! input program itself is unusable or a solver contract is violated.

use crate::shared::models::ir::StmtId;
use thiserror::Error;

/// Main error type for classflow-ir operations
#[derive(Debug, Error)]
pub enum ClassflowError {
    /// A statement references an entity that does not exist in the program.
    /// Fatal: the analysis aborts with no partial results.
    #[error("malformed IR at statement {stmt}: {message}")]
    MalformedIr { stmt: StmtId, message: String },

    /// A solver precondition was violated (missing entry method, arity
    /// mismatch discovered during call-edge wiring, ...).
    #[error("analysis error: {0}")]
    Analysis(String),
}

impl ClassflowError {
    pub fn malformed(stmt: StmtId, message: impl Into<String>) -> Self {
        ClassflowError::MalformedIr {
            stmt,
            message: message.into(),
        }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        ClassflowError::Analysis(message.into())
    }
}

/// Result type alias for classflow operations
pub type Result<T> = std::result::Result<T, ClassflowError>;
