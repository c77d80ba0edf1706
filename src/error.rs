//! Error types for the identification core
//!
//! Every error here is local and recoverable: a failed operation leaves the
//! session exactly as it was before the call.

use thiserror::Error;

/// Errors raised by session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifyError {
    /// Answer does not belong to the step currently being asked
    #[error("'{value}' is not an option for '{trait_key}' at step {step}")]
    InvalidOption {
        step: usize,
        trait_key: String,
        value: String,
    },

    /// Answer is missing its trait key or value
    #[error("malformed option: {0}")]
    MalformedOption(String),

    /// All steps are answered; go back or reset before answering again
    #[error("identification is complete; go back or reset to answer again")]
    SequenceComplete,

    #[error("unknown filter category '{0}'")]
    UnknownFilterCategory(String),

    /// Restored session state does not fit the question sequence
    #[error("invalid session snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Catalog validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("plant #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("plant #{index} ({name}) has height min {min} above max {max}")]
    InvalidHeight {
        index: usize,
        name: String,
        min: f64,
        max: f64,
    },
}

/// Question sequence validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("question sequence has no steps")]
    Empty,

    #[error("step {step} has no trait key")]
    MissingTraitKey { step: usize },

    #[error("step {step} ('{trait_key}') has no options")]
    NoOptions { step: usize, trait_key: String },

    #[error("step {step} ('{trait_key}') offers value '{value}' more than once")]
    DuplicateValue {
        step: usize,
        trait_key: String,
        value: String,
    },

    #[error("step {step} ('{trait_key}') has an option with an empty value")]
    EmptyValue { step: usize, trait_key: String },
}
