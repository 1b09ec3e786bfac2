//! Error types for the enrollment engine.

use std::collections::BTreeMap;

/// Field-level validation messages, keyed by field name.
///
/// Kept ordered so error output is stable across runs. These are rendered
/// inline next to the offending fields, never as a generic failure.
pub type FieldErrors = BTreeMap<String, String>;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Static flow-definition errors, caught when a schema is constructed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Flow {flow} declares no steps")]
    EmptyFlow { flow: String },

    #[error("Flow {flow} declares duplicate step name {step}")]
    DuplicateStep { flow: String, step: String },

    #[error("Flow {flow} declares field {field} in more than one step")]
    DuplicateField { flow: String, field: String },
}

/// Step-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize step payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while moving through a flow's steps.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Unknown flow: {0}")]
    UnknownFlow(String),

    #[error("Flow {flow} has no step at index {index}")]
    UnknownStep { flow: String, index: usize },

    #[error("Step {step} failed validation for {} field(s)", .errors.len())]
    Validation { step: String, errors: FieldErrors },

    #[error("Step {step} requires {missing} to be completed first")]
    OutOfOrder { step: String, missing: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by the final submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("A submission is already in flight for this session")]
    InFlight,

    #[error("Step {step} failed validation for {} field(s)", .errors.len())]
    Validation { step: String, errors: FieldErrors },

    #[error("Flow is incomplete: step {missing} has no stored payload")]
    Incomplete { missing: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiFailure),
}

/// Failures at the network boundary, tagged by kind so callers can
/// distinguish a server rejection from a dead connection.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("Signup rejected with status {status}: {msg}")]
    Rejected { status: u16, msg: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body (status {status}): {detail}")]
    InvalidBody { status: u16, detail: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
