//! Pure diff of a fetched chapter list against persisted chapters.

use std::collections::{HashMap, HashSet};
use tome_db::{Change, ChangeSet, Chapter, ChapterDiff, NovelId};
use tome_source::ChapterSnapshot;

/// Compute the inserts and updates that bring a novel's persisted chapters in
/// line with a freshly fetched snapshot list.
///
/// Chapters are matched by path only, and only persisted rows belonging to
/// `novel_id` take part. A chapter's position is its index in `snapshots`.
/// Known chapters produce an [`Change::Update`] when name, release time,
/// page or position differ (position drift alone is enough); chapters missing
/// from `snapshots` are left alone. If a path occurs more than once in
/// `snapshots`, only its first occurrence counts.
///
/// # Examples
///
/// ```
/// use tome_source::ChapterSnapshot;
/// use tome_sync::reconcile;
///
/// let snapshots = [ChapterSnapshot::new("/c1", "Ch1"), ChapterSnapshot::new("/c2", "Ch2")];
/// let changes = reconcile(1, &[], &snapshots);
/// assert_eq!(changes.inserts().map(|(_, position)| position).collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub fn reconcile(novel_id: NovelId, persisted: &[Chapter], snapshots: &[ChapterSnapshot]) -> ChangeSet {
    let known: HashMap<&str, &Chapter> = persisted
        .iter()
        .filter(|chapter| chapter.novel_id == novel_id)
        .map(|chapter| (chapter.path.as_str(), chapter))
        .collect();
    let mut seen = HashSet::with_capacity(snapshots.len());
    let mut changes = ChangeSet::default();
    for (index, snapshot) in snapshots.iter().enumerate() {
        if !seen.insert(snapshot.path.as_str()) {
            tracing::debug!(novel_id, path = %snapshot.path, "skipping repeated chapter path");
            continue;
        }
        let position = u32::try_from(index).unwrap_or(u32::MAX);
        match known.get(snapshot.path.as_str()) {
            None => changes.push(Change::Insert { chapter: snapshot.clone(), position }),
            Some(existing) => {
                if let Some(change) = drift(existing, snapshot, position) {
                    changes.push(change);
                }
            },
        }
    }
    changes
}

fn drift(existing: &Chapter, snapshot: &ChapterSnapshot, position: u32) -> Option<Change> {
    let name_changed = existing.name != snapshot.name;
    let release_changed = existing.release_time != snapshot.release_time;
    let page_changed = existing.page != snapshot.page();
    let position_changed = existing.position != position;
    if !(name_changed || release_changed || page_changed || position_changed) {
        return None;
    }
    let diff = ChapterDiff {
        name: name_changed.then(|| snapshot.name.clone()),
        release_time: release_changed.then(|| snapshot.release_time.clone()),
        page: page_changed.then(|| snapshot.page().to_string()),
    };
    Some(Change::Update { id: existing.id, diff, position })
}
