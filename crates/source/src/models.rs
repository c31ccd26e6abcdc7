//! Normalized shapes every content source produces.
//!
//! Snapshots are ephemeral: they describe what the remote catalog looked like
//! at fetch time and only live for one sync cycle.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Page token assumed when a source does not paginate its chapter list.
pub const DEFAULT_PAGE: &str = "1";

/// A novel as reported by its source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelSnapshot {
    /// Path of the novel within its source.
    pub path: String,
    pub name: String,
    /// Cover image URL, possibly relative to the source's site.
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: NovelStatus,
    /// Number of chapter-list pages for paginated sources, `0` otherwise.
    #[serde(default)]
    pub total_pages: u32,
    /// Chapters in remote order; index in this list is the chapter's position.
    #[serde(default)]
    pub chapters: Vec<ChapterSnapshot>,
    #[serde(default)]
    pub latest_chapter: Option<ChapterSnapshot>,
}

/// A chapter as reported by its source.
///
/// The position of a chapter is not stored here: it is the chapter's index in
/// [`NovelSnapshot::chapters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSnapshot {
    /// Path of the chapter, unique within a novel of a source.
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub release_time: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<f64>,
    #[serde(default)]
    pub page: Option<String>,
}
impl ChapterSnapshot {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            release_time: None,
            chapter_number: None,
            page: None,
        }
    }

    pub fn with_release_time(mut self, release_time: impl Into<String>) -> Self {
        self.release_time = Some(release_time.into());
        self
    }

    pub fn with_chapter_number(mut self, number: f64) -> Self {
        self.chapter_number = Some(number);
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// The page token, falling back to [`DEFAULT_PAGE`].
    pub fn page(&self) -> &str {
        self.page.as_deref().unwrap_or(DEFAULT_PAGE)
    }
}

/// One page of a paginated chapter list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    #[serde(default)]
    pub chapters: Vec<ChapterSnapshot>,
}

/// Publication status, as loosely reported by sources.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NovelStatus {
    #[display("Ongoing")]
    Ongoing,
    #[display("Completed")]
    Completed,
    #[display("On Hiatus")]
    OnHiatus,
    #[display("Cancelled")]
    Cancelled,
    #[display("Licensed")]
    Licensed,
    #[display("Publishing Finished")]
    PublishingFinished,
    #[default]
    #[display("Unknown")]
    Unknown,
}
impl FromStr for NovelStatus {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| c.is_alphanumeric()).collect::<String>().to_lowercase();
        Ok(match normalized.as_str() {
            "ongoing" => Self::Ongoing,
            "completed" | "complete" => Self::Completed,
            "onhiatus" | "hiatus" => Self::OnHiatus,
            "cancelled" | "canceled" | "dropped" => Self::Cancelled,
            "licensed" => Self::Licensed,
            "publishingfinished" => Self::PublishingFinished,
            _ => Self::Unknown,
        })
    }
}
impl From<String> for NovelStatus {
    fn from(s: String) -> Self {
        // Infallible, see FromStr above.
        s.parse().unwrap_or_default()
    }
}
impl From<NovelStatus> for String {
    fn from(status: NovelStatus) -> Self {
        status.to_string()
    }
}
