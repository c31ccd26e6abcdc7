//! Content source plugin contract and the gateway in front of it.
//!
//! A [`ContentSource`] adapts one remote catalog into the normalized
//! [`NovelSnapshot`] / [`ChapterSnapshot`] shapes. Sources are collected in an
//! explicit [`Registry`] and only ever invoked through a [`Gateway`], which
//! resolves them by identifier and turns provider failures into typed errors.

pub mod error;
mod gateway;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod models;
mod registry;
mod source;
mod url;

pub use crate::error::{ProviderError, ProviderErrorKind, ProviderResult};
pub use crate::gateway::Gateway;
pub use crate::models::{ChapterSnapshot, DEFAULT_PAGE, NovelSnapshot, NovelStatus, PageSnapshot};
pub use crate::registry::{Registry, SourceHandle};
pub use crate::source::{Capability, ContentSource, ImageSource, Operation, PageSource, UrlResolver};
pub use crate::url::is_absolute_url;

/// Identifier of the built-in local pseudo-source.
///
/// Novels imported from local files belong to it; there is nothing remote to
/// synchronize them against.
pub const LOCAL_SOURCE_ID: &str = "local";
