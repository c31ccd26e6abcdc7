//! The write model produced by reconciliation and applied by the repository.

use crate::ChapterId;
use tome_source::ChapterSnapshot;

/// Field-level difference between a persisted chapter and its snapshot.
///
/// `None` means "leave unchanged". `release_time` is doubly optional because
/// clearing a release time is itself a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterDiff {
    pub name: Option<String>,
    pub release_time: Option<Option<String>>,
    pub page: Option<String>,
}
impl ChapterDiff {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.release_time.is_none() && self.page.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A chapter path not yet known for the novel.
    Insert { chapter: ChapterSnapshot, position: u32 },
    /// A known chapter that drifted. The position is always written.
    Update { id: ChapterId, diff: ChapterDiff, position: u32 },
}

/// Ordered inserts and updates for one novel. Never contains deletes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}
impl ChangeSet {
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn inserts(&self) -> impl Iterator<Item = (&ChapterSnapshot, u32)> {
        self.changes.iter().filter_map(|change| match change {
            Change::Insert { chapter, position } => Some((chapter, *position)),
            Change::Update { .. } => None,
        })
    }

    pub fn updates(&self) -> impl Iterator<Item = (ChapterId, &ChapterDiff, u32)> {
        self.changes.iter().filter_map(|change| match change {
            Change::Update { id, diff, position } => Some((*id, diff, *position)),
            Change::Insert { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self { changes: iter.into_iter().collect() }
    }
}
impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;
    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// A chapter row created while applying a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedChapter {
    pub id: ChapterId,
    pub path: String,
}

/// What applying a [`ChangeSet`] actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    /// Chapters that did not exist before, in change-set order.
    pub inserted: Vec<InsertedChapter>,
    /// Rows whose stored values changed, including inserts that found an
    /// existing row and fell back to an update.
    pub updated: usize,
}
