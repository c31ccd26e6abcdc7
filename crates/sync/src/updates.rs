//! "Has updates" bookkeeping in the key-value cache.
//!
//! The presentation layer remembers the latest chapter it has shown for a
//! novel under [`latest_chapter_key`] and keeps one boolean per chapter-list
//! page under [`page_updates_key`]. A sync only ever raises those flags.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use tome_db::{KeyValueExt, KeyValueStore, NovelId};
use tome_source::ChapterSnapshot;

pub fn latest_chapter_key(novel_id: NovelId) -> String {
    format!("NOVEL_LATEST_CHAPTER_{novel_id}")
}

pub fn page_updates_key(novel_id: NovelId) -> String {
    format!("NOVEL_PAGE_UPDATES_{novel_id}")
}

/// Only the path of the remembered chapter matters here.
#[derive(Deserialize)]
struct RememberedChapter {
    path: String,
}

/// Mark every cached "has updates" flag of a novel as `true` when the
/// snapshot's latest chapter differs from the remembered one.
///
/// Returns whether flags were rewritten. Nothing happens when the snapshot
/// has no latest chapter or no flags are cached yet.
pub(crate) async fn invalidate_has_updates(
    kv: &dyn KeyValueStore,
    novel_id: NovelId,
    latest: Option<&ChapterSnapshot>,
) -> Result<bool> {
    let Some(latest) = latest else {
        return Ok(false);
    };
    let remembered: Option<RememberedChapter> =
        kv.get(&latest_chapter_key(novel_id)).await.or_raise(|| ErrorKind::KeyValue)?;
    if remembered.is_some_and(|chapter| chapter.path == latest.path) {
        return Ok(false);
    }
    let key = page_updates_key(novel_id);
    let Some(flags) = kv.get::<Vec<bool>>(&key).await.or_raise(|| ErrorKind::KeyValue)? else {
        return Ok(false);
    };
    kv.set(&key, &vec![true; flags.len()]).await.or_raise(|| ErrorKind::KeyValue)?;
    tracing::debug!(novel_id, pages = flags.len(), "has-updates flags invalidated");
    Ok(true)
}
