use crate::error::{Error, ErrorKind, Result};
use crate::models::timestamp_from_row;
use crate::{ChapterId, NovelId};
use exn::ResultExt;
use time::UtcDateTime;

/// A chapter as persisted in the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub novel_id: NovelId,
    /// Path of the chapter within its source; unique per novel.
    pub path: String,
    pub name: String,
    pub release_time: Option<String>,
    pub chapter_number: Option<f64>,
    pub page: String,
    /// Index of the chapter in the most recently synced remote ordering.
    pub position: u32,
    pub is_downloaded: bool,
    pub updated_at: UtcDateTime,
}

/// Sort order for [`Repository::list_chapters`](crate::Repository::list_chapters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChapterOrder {
    /// Remote order, first chapter first.
    #[default]
    PositionAsc,
    /// Newest chapters first.
    PositionDesc,
}
impl ChapterOrder {
    pub(crate) fn ascending(self) -> bool {
        matches!(self, Self::PositionAsc)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ChapterRow {
    id: i64,
    novel_id: i64,
    path: String,
    name: String,
    release_time: Option<String>,
    chapter_number: Option<f64>,
    page: String,
    position: i64,
    is_downloaded: bool,
    updated_at: i64,
}
impl TryFrom<ChapterRow> for Chapter {
    type Error = Error;
    fn try_from(row: ChapterRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            novel_id: row.novel_id,
            path: row.path,
            name: row.name,
            release_time: row.release_time,
            chapter_number: row.chapter_number,
            page: row.page,
            position: u32::try_from(row.position).or_raise(|| ErrorKind::InvalidData("chapter position"))?,
            is_downloaded: row.is_downloaded,
            updated_at: timestamp_from_row(row.updated_at, "chapter update time")?,
        })
    }
}
