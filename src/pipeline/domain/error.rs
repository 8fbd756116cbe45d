//! Error types for pipeline domain validation.

use thiserror::Error;

/// Errors returned while constructing domain pipeline values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// The contact name is empty after trimming.
    #[error("contact name must not be empty")]
    EmptyContactName,

    /// The stage name is empty after trimming.
    #[error("stage name must not be empty")]
    EmptyStageName,
}
