//! Sync Error Types
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.
//! Every variant names the subsystem that failed; the failure itself is kept
//! as the child frame raised from that subsystem's own error type.

use derive_more::{Display, Error};
use tome_db::NovelId;

/// A sync error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a sync failure.
///
/// ### Operational Errors
/// - [`ErrorKind::UnknownSource`]
/// - [`ErrorKind::NovelFailed`] - one novel of a library-wide sync failed.
///
/// ### Dependency Errors
/// - [`ErrorKind::Fetch`]
/// - [`ErrorKind::Persistence`]
/// - [`ErrorKind::FileSystem`]
/// - [`ErrorKind::KeyValue`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The novel's source is not registered. Nothing was fetched or written.
    #[display("unknown source: {_0}")]
    UnknownSource(#[error(not(source))] String),
    /// The source gateway failed while fetching the snapshot, an image or a chapter.
    #[display("fetch failed")]
    Fetch,
    /// Reading or writing the library database failed.
    #[display("persistence failed")]
    Persistence,
    /// Writing to the file cache failed.
    #[display("file system operation failed")]
    FileSystem,
    /// Reading or writing the key-value cache failed.
    #[display("key-value cache failed")]
    KeyValue,
    #[display("sync of novel {_0} failed")]
    NovelFailed(#[error(not(source))] NovelId),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in this crate retries; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::Persistence)
    }
}
