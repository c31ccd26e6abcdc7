//! File cache for the library.
//!
//! Cover images and downloaded chapter bodies are written through a
//! [`StorageBackend`], keeping the sync engine independent of where the bytes
//! end up. Paths handed to a backend are always relative to its root and are
//! validated with [`validate_path`] before use.

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::{segment, validate as validate_path};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
