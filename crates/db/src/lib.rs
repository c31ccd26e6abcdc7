//! SQLite persistence for the library.
//!
//! Novels and chapters live in two tables keyed by their natural identifiers,
//! `(source_id, path)` and `(novel_id, path)`. Reconciliation produces a
//! [`ChangeSet`] that the [`Repository`] applies transactionally. A small
//! key-value cache ([`KeyValueStore`]) sits next to them for memoized flags.

mod db;
pub mod error;
pub mod kv;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::kv::{KeyValueExt, KeyValueHandle, KeyValueStore, MemoryStore, SqliteStore};
pub use crate::models::{
    AppliedChanges, Change, ChangeSet, Chapter, ChapterDiff, ChapterOrder, DEFAULT_AUTHOR, InsertedChapter, Novel,
    NovelMetadata,
};
pub use crate::repo::Repository;

pub type NovelId = i64;
pub type ChapterId = i64;
