//! Error types for code generation

use thiserror::Error;

/// Error type for C emission failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("codegen: `{function}` jumps to undefined label `{label}`")]
    UndefinedLabel { function: String, label: String },

    #[error("codegen: `{function}` defines label `{label}` more than once")]
    DuplicateLabel { function: String, label: String },

    #[error("codegen: `{function}` returns without a value")]
    MissingReturnValue { function: String },

    #[error("codegen: formatting failed")]
    Format(#[from] std::fmt::Error),
}
