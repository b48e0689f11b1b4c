// src/errors.rs

//! Crate-wide error types and helpers.
//!
//! Each layer has its own `thiserror` enum (variables, graph, execution);
//! [`StackdagError`] aggregates them so callers can use one `Result` alias.

use thiserror::Error;

/// Variable registry errors (spec §4.1 contract).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VarError {
    #[error("variable '{0}' is already declared")]
    DuplicateKey(String),

    #[error("default for variable '{key}' is invalid: {reason}")]
    InvalidDefault { key: String, reason: String },

    #[error("variable '{0}' is not declared")]
    UnknownKey(String),

    #[error("value for variable '{key}' does not satisfy type {expected}: got {got}")]
    TypeMismatch {
        key: String,
        expected: String,
        got: String,
    },

    #[error("value for variable '{key}' is not one of the allowed choices: got {got}")]
    ChoiceViolation { key: String, got: String },

    /// All required-but-unresolved keys at once, so the caller sees the full
    /// list instead of fixing them one by one.
    #[error("missing required variables: {0:?}")]
    MissingRequired(Vec<String>),
}

/// Job graph construction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("job '{0}' is already declared")]
    DuplicateJob(String),

    #[error("edge references unknown job '{0}'")]
    UnknownJob(String),

    #[error("adding edge '{from}' -> '{to}' would create a cycle")]
    Cycle { from: String, to: String },

    #[error("job set is non-empty but no job has in-degree zero")]
    NoEntryJob,
}

/// Execution-layer errors that are not per-job outcomes: wiring problems
/// detected before any dispatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecError {
    #[error("no handler registered for job '{0}'")]
    MissingHandler(String),
}

/// Errors from the prior-run resource lookup collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no '{resource_type}' resource named '{name}' from a prior run")]
    NotFound { name: String, resource_type: String },
}

#[derive(Error, Debug)]
pub enum StackdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Var(#[from] VarError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("unknown stack: {0}")]
    UnknownStack(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StackdagError>;
