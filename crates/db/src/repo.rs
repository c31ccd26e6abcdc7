//! Repository for novels and their chapters.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    AppliedChanges, Change, ChangeSet, Chapter, ChapterOrder, ChapterRow, InsertedChapter, Novel, NovelMetadata,
    NovelRow,
};
use crate::{ChapterId, NovelId};
use exn::{OptionExt, ResultExt};
use sqlx::SqlitePool;
use time::UtcDateTime;
use tome_source::{ChapterSnapshot, NovelSnapshot};
use tracing::instrument;

fn now() -> i64 {
    UtcDateTime::now().unix_timestamp()
}

/// Repository for the novels and chapters tables.
///
/// Novels are identified by `(source_id, path)` and chapters by
/// `(novel_id, path)`; both pairs are unique. Chapter rows are only ever
/// inserted or updated here, never deleted.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Novels
    // =========================================================================

    /// Add a novel to the database, or return the existing row for the same
    /// source and path untouched.
    pub async fn insert_novel(&self, source_id: &str, novel: &NovelSnapshot) -> Result<Novel> {
        let metadata = NovelMetadata::from(novel);
        sqlx::query(include_str!("../queries/insert_novel.sql"))
            .bind(source_id)
            .bind(&novel.path)
            .bind(&novel.name)
            .bind(novel.cover.as_deref())
            .bind(novel.summary.as_deref())
            .bind(novel.author.as_deref())
            .bind(novel.artist.as_deref())
            .bind(metadata.genres_json()?)
            .bind(novel.status.to_string())
            .bind(i64::from(novel.total_pages))
            .bind(now())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.get_novel_by_path(source_id, &novel.path).await?.ok_or_raise(|| ErrorKind::Database)
    }

    pub async fn get_novel(&self, id: NovelId) -> Result<Option<Novel>> {
        let row: Option<NovelRow> = sqlx::query_as(include_str!("../queries/get_novel.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Novel::try_from).transpose()
    }

    pub async fn get_novel_by_path(&self, source_id: &str, path: &str) -> Result<Option<Novel>> {
        let row: Option<NovelRow> = sqlx::query_as(include_str!("../queries/get_novel_by_path.sql"))
            .bind(source_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Novel::try_from).transpose()
    }

    /// Novels the user follows, oldest first.
    pub async fn list_library_novels(&self) -> Result<Vec<Novel>> {
        let rows: Vec<NovelRow> = sqlx::query_as(include_str!("../queries/list_library_novels.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Novel::try_from).collect()
    }

    pub async fn set_in_library(&self, id: NovelId, in_library: bool) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/set_in_library.sql"))
            .bind(in_library)
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NovelNotFound(id));
        }
        Ok(())
    }

    /// Overwrite every metadata field of a novel in one transaction.
    ///
    /// A missing author is stored as [`DEFAULT_AUTHOR`](crate::DEFAULT_AUTHOR).
    #[instrument(level = "debug", skip(self, metadata))]
    pub async fn update_metadata(&self, id: NovelId, metadata: &NovelMetadata) -> Result<()> {
        let genres = metadata.genres_json()?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/update_metadata.sql"))
            .bind(&metadata.name)
            .bind(metadata.cover.as_deref())
            .bind(metadata.summary.as_deref())
            .bind(metadata.author_or_default())
            .bind(metadata.artist.as_deref())
            .bind(genres)
            .bind(metadata.status.to_string())
            .bind(i64::from(metadata.total_pages))
            .bind(now())
            .bind(id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NovelNotFound(id));
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    pub async fn update_total_pages(&self, id: NovelId, total_pages: u32) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/update_total_pages.sql"))
            .bind(i64::from(total_pages))
            .bind(now())
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::NovelNotFound(id));
        }
        Ok(())
    }

    // =========================================================================
    // Chapters
    // =========================================================================

    pub async fn list_chapters(&self, novel_id: NovelId, order: ChapterOrder) -> Result<Vec<Chapter>> {
        let rows: Vec<ChapterRow> = sqlx::query_as(include_str!("../queries/list_chapters.sql"))
            .bind(novel_id)
            .bind(order.ascending())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Chapter::try_from).collect()
    }

    pub async fn get_chapter(&self, id: ChapterId) -> Result<Option<Chapter>> {
        let row: Option<ChapterRow> = sqlx::query_as(include_str!("../queries/get_chapter.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Chapter::try_from).transpose()
    }

    /// Apply a change-set to a novel's chapters in a single transaction.
    ///
    /// Inserts are conditional: if a row with the same path appeared since
    /// the change-set was computed, the insert turns into an update that only
    /// touches the row when one of name, release time, page or position
    /// differs. Any failure rolls back every change in the set.
    #[instrument(level = "debug", skip(self, changes), fields(changes = changes.len()))]
    pub async fn apply_changes(&self, novel_id: NovelId, changes: &ChangeSet) -> Result<AppliedChanges> {
        let mut applied = AppliedChanges::default();
        if changes.is_empty() {
            return Ok(applied);
        }
        let now = now();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for change in changes.iter() {
            match change {
                Change::Insert { chapter, position } => {
                    match Self::insert_chapter(&mut *tx, novel_id, chapter, *position, now).await? {
                        Some(id) => applied.inserted.push(InsertedChapter { id, path: chapter.path.clone() }),
                        None => {
                            tracing::debug!(novel_id, path = %chapter.path, "chapter already exists, updating instead");
                            if Self::update_chapter_if_drifted(&mut *tx, novel_id, chapter, *position, now).await? {
                                applied.updated += 1;
                            }
                        },
                    }
                },
                Change::Update { id, diff, position } => {
                    let result = sqlx::query(include_str!("../queries/update_chapter.sql"))
                        .bind(diff.name.as_deref())
                        .bind(diff.release_time.is_some())
                        .bind(diff.release_time.as_ref().and_then(|time| time.as_deref()))
                        .bind(diff.page.as_deref())
                        .bind(i64::from(*position))
                        .bind(now)
                        .bind(*id)
                        .bind(novel_id)
                        .execute(&mut *tx)
                        .await
                        .or_raise(|| ErrorKind::Database)?;
                    if result.rows_affected() == 0 {
                        exn::bail!(ErrorKind::ChapterNotFound(*id));
                    }
                    applied.updated += 1;
                },
            }
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::debug!(inserted = applied.inserted.len(), updated = applied.updated, "chapter changes committed");
        Ok(applied)
    }

    async fn insert_chapter(
        tx: &mut sqlx::SqliteConnection,
        novel_id: NovelId,
        chapter: &ChapterSnapshot,
        position: u32,
        now: i64,
    ) -> Result<Option<ChapterId>> {
        sqlx::query_scalar::<_, ChapterId>(include_str!("../queries/insert_chapter_if_absent.sql"))
            .bind(novel_id)
            .bind(&chapter.path)
            .bind(&chapter.name)
            .bind(chapter.release_time.as_deref())
            .bind(chapter.chapter_number)
            .bind(chapter.page())
            .bind(i64::from(position))
            .bind(now)
            .fetch_optional(tx)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    async fn update_chapter_if_drifted(
        tx: &mut sqlx::SqliteConnection,
        novel_id: NovelId,
        chapter: &ChapterSnapshot,
        position: u32,
        now: i64,
    ) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/update_chapter_if_drifted.sql"))
            .bind(&chapter.name)
            .bind(chapter.release_time.as_deref())
            .bind(chapter.page())
            .bind(i64::from(position))
            .bind(now)
            .bind(novel_id)
            .bind(&chapter.path)
            .execute(tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_downloaded(&self, id: ChapterId, downloaded: bool) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/mark_downloaded.sql"))
            .bind(downloaded)
            .bind(id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            exn::bail!(ErrorKind::ChapterNotFound(id));
        }
        Ok(())
    }
}
