//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files live in a `HashMap` behind a [`RwLock`], so all trait methods can
/// operate on `&self` without external synchronisation. Writes can be made
/// to fail on demand to exercise error paths of callers.
///
/// # Examples
///
/// ```
/// use tome_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::default();
/// backend.write(Path::new("src/1/cover.png"), b"png").await?;
/// assert!(backend.exists(Path::new("src/1/cover.png")).await?);
/// assert!(backend.exists(Path::new("src/1")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    dirs: RwLock<HashSet<PathBuf>>,
    fail_writes: AtomicBool,
}

impl MockBackend {
    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every subsequent `write` and `create_dir` fail with a permission error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every file path currently stored.
    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }

    async fn register_parents(&self, path: &Path) {
        let mut dirs = self.dirs.write().await;
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            files: RwLock::new(HashMap::new()),
            dirs: RwLock::new(HashSet::new()),
            fail_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        if self.files.read().await.contains_key(&path) {
            return Ok(true);
        }
        Ok(self.dirs.read().await.contains(&path))
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.check_writable(&path)?;
        self.register_parents(&path).await;
        self.dirs.write().await.insert(path);
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        self.files.read().await.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.check_writable(&path)?;
        self.register_parents(&path).await;
        self.files.write().await.insert(path, data.to_vec());
        Ok(())
    }

    fn uri(&self, path: &Path) -> Result<String> {
        Ok(format!("mock://{}", validate_path(path)?.display()))
    }
}
