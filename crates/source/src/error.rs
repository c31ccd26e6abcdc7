//! Source Error Types
//!
//! Two layers of errors live here:
//!
//! - [`ProviderErrorKind`] is what a [`ContentSource`](crate::ContentSource)
//!   implementation raises when talking to its remote catalog.
//! - [`ErrorKind`] is what the [`Gateway`](crate::Gateway) raises to its
//!   callers. Provider failures are never swallowed: they become the child of
//!   an [`ErrorKind::Fetch`] frame naming the source and the operation.

use crate::Operation;
use derive_more::{Display, Error};

/// A gateway error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised by a content source implementation.
pub type ProviderError = exn::Exn<ProviderErrorKind>;
/// Result type alias for content source implementations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No plugin is registered under this identifier. Raised before any I/O.
    #[display("unknown source: {_0}")]
    UnknownSource(#[error(not(source))] String),
    /// The plugin exists but lacks the optional capability the operation needs.
    #[display("source {source_id} does not support {operation}")]
    UnsupportedOperation { source_id: String, operation: Operation },
    /// The plugin failed while performing the operation.
    #[display("source {source_id} failed during {operation}")]
    Fetch { source_id: String, operation: Operation },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// The gateway itself never retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

/// Failure categories for content source implementations.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The remote could not be reached or answered with an error.
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// The remote answered, but the response could not be understood.
    #[display("parse error: {_0}")]
    Parse(#[error(not(source))] String),
}
