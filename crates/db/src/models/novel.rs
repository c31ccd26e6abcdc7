use crate::NovelId;
use crate::error::{Error, ErrorKind, Result};
use crate::models::timestamp_from_row;
use exn::ResultExt;
use time::UtcDateTime;
use tome_source::{NovelSnapshot, NovelStatus};

/// Author written by a metadata refresh when the source reports none.
pub const DEFAULT_AUTHOR: &str = "unknown";

/// A novel as persisted in the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Novel {
    pub id: NovelId,
    pub source_id: String,
    /// Path of the novel within its source; unique per source.
    pub path: String,
    pub name: String,
    pub cover: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub genres: Vec<String>,
    pub status: NovelStatus,
    pub total_pages: u32,
    /// Whether the user follows this novel; library-wide syncs only visit these.
    pub in_library: bool,
    pub updated_at: UtcDateTime,
}

/// Every metadata field a refresh overwrites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NovelMetadata {
    pub name: String,
    pub cover: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub genres: Vec<String>,
    pub status: NovelStatus,
    pub total_pages: u32,
}
impl From<&NovelSnapshot> for NovelMetadata {
    fn from(novel: &NovelSnapshot) -> Self {
        Self {
            name: novel.name.clone(),
            cover: novel.cover.clone(),
            summary: novel.summary.clone(),
            author: novel.author.clone(),
            artist: novel.artist.clone(),
            genres: novel.genres.clone(),
            status: novel.status,
            total_pages: novel.total_pages,
        }
    }
}
impl NovelMetadata {
    pub fn with_cover(mut self, cover: Option<String>) -> Self {
        self.cover = cover;
        self
    }

    pub(crate) fn author_or_default(&self) -> &str {
        self.author.as_deref().unwrap_or(DEFAULT_AUTHOR)
    }

    pub(crate) fn genres_json(&self) -> Result<String> {
        serde_json::to_string(&self.genres).or_raise(|| ErrorKind::InvalidData("genres"))
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct NovelRow {
    id: i64,
    source_id: String,
    path: String,
    name: String,
    cover: Option<String>,
    summary: Option<String>,
    author: Option<String>,
    artist: Option<String>,
    genres: String,
    status: String,
    total_pages: i64,
    in_library: bool,
    updated_at: i64,
}
impl TryFrom<NovelRow> for Novel {
    type Error = Error;
    fn try_from(row: NovelRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            source_id: row.source_id,
            path: row.path,
            name: row.name,
            cover: row.cover,
            summary: row.summary,
            author: row.author,
            artist: row.artist,
            genres: serde_json::from_str(&row.genres).or_raise(|| ErrorKind::InvalidData("genres"))?,
            // Unrecognized values degrade to `Unknown` rather than failing the read.
            status: NovelStatus::from(row.status),
            total_pages: u32::try_from(row.total_pages).or_raise(|| ErrorKind::InvalidData("total pages"))?,
            in_library: row.in_library,
            updated_at: timestamp_from_row(row.updated_at, "novel update time")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> NovelRow {
        NovelRow {
            id: 7,
            source_id: "src".to_string(),
            path: "/novel/7".to_string(),
            name: "Seven".to_string(),
            cover: None,
            summary: None,
            author: Some("Someone".to_string()),
            artist: None,
            genres: r#"["Fantasy","Drama"]"#.to_string(),
            status: "On Hiatus".to_string(),
            total_pages: 3,
            in_library: true,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_row_to_model() {
        let novel = Novel::try_from(row()).unwrap();
        assert_eq!(novel.genres, vec!["Fantasy".to_string(), "Drama".to_string()]);
        assert_eq!(novel.status, NovelStatus::OnHiatus);
        assert_eq!(novel.total_pages, 3);
        assert_eq!(novel.updated_at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_row_with_corrupt_genres() {
        let mut row = row();
        row.genres = "not json".to_string();
        let err = Novel::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("genres")));
    }

    #[test]
    fn test_row_with_negative_pages() {
        let mut row = row();
        row.total_pages = -1;
        let err = Novel::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("total pages")));
    }

    #[test]
    fn test_metadata_author_default() {
        let metadata = NovelMetadata::default();
        assert_eq!(metadata.author_or_default(), DEFAULT_AUTHOR);
        let metadata = NovelMetadata { author: Some("A".to_string()), ..Default::default() };
        assert_eq!(metadata.author_or_default(), "A");
    }
}
