//! Persistence Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The underlying `sqlx` or `serde_json` error is kept as
//! the child of the frame raised here.

use crate::{ChapterId, NovelId};
use derive_more::{Display, Error};

/// A persistence error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    #[display("novel not found: {_0}")]
    NovelNotFound(#[error(not(source))] NovelId),
    #[display("chapter not found: {_0}")]
    ChapterNotFound(#[error(not(source))] ChapterId),
    /// A stored value could not be converted to or from its model.
    #[display("invalid data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Only generic database failures qualify: a busy or locked database
    /// usually clears up on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
