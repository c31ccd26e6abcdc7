//! Storage backend trait and implementations.
//!
//! The sync engine only needs a handful of operations from the file cache:
//! existence checks, directory creation and whole-file reads/writes. Anything
//! that can provide those (local disk, an in-memory map for tests) can stand
//! behind a [`StorageBackend`].

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for file cache backends.
///
/// All operations are asynchronous so that writes are suspension points of
/// the surrounding sync cycle rather than blocking calls.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tome_storage::{backend::StorageBackend, error::Result};
///
/// async fn cache_cover(backend: &dyn StorageBackend, image: &[u8]) -> Result<String> {
///     let dir = Path::new("source/12");
///     if !backend.exists(dir).await? {
///         backend.create_dir(dir).await?;
///     }
///     let path = dir.join("cover.png");
///     backend.write(&path, image).await?;
///     backend.uri(&path)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Check if a file or directory exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory (and any missing parents).
    ///
    /// Creating a directory that already exists is not an error.
    async fn create_dir(&self, path: &Path) -> Result<()>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, replacing any existing file.
    ///
    /// Implementations create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// The location consumers should use to load the file, e.g. a `file://`
    /// URI for the local backend.
    ///
    /// The path is validated but the file does not need to exist yet.
    fn uri(&self, path: &Path) -> Result<String>;
}
