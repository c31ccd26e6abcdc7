//! Library synchronization engine.
//!
//! Merges freshly fetched source snapshots into the persisted library:
//! [`reconcile`] computes the chapter change-set as a pure function, and the
//! [`Synchronizer`] drives the whole cycle around it (cover caching, the
//! metadata and chapter transactions, automatic downloads and "has updates"
//! invalidation). [`sync_library`] runs cycles for every followed novel.

mod buster;
mod download;
pub mod error;
mod options;
mod reconcile;
mod stream;
mod sync;
mod updates;

pub use crate::buster::CacheBuster;
pub use crate::download::{ChapterDownloader, DownloaderHandle, StorageDownloader, chapter_file};
pub use crate::options::SyncOptions;
pub use crate::reconcile::reconcile;
pub use crate::stream::{SyncEvent, sync_library};
pub use crate::sync::{DownloadFailure, SyncReport, SyncStage, Synchronizer};
pub use crate::updates::{latest_chapter_key, page_updates_key};
