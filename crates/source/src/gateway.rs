//! The Source Gateway: the only way the rest of the system talks to sources.

use crate::error::{ErrorKind, Result};
use crate::registry::{Registry, SourceHandle};
use crate::url::{is_absolute_url, join_site};
use crate::{Capability, ChapterSnapshot, ContentSource, NovelSnapshot, Operation, PageSnapshot};
use exn::{OptionExt, ResultExt};
use std::sync::Arc;
use tracing::instrument;

/// Resolves sources by identifier and invokes their operations.
///
/// Every operation looks the source up first, so an unknown identifier fails
/// with [`ErrorKind::UnknownSource`] before any I/O happens. Provider failures
/// are wrapped in [`ErrorKind::Fetch`] and never retried here.
#[derive(Clone)]
pub struct Gateway {
    registry: Arc<Registry>,
}

impl Gateway {
    pub fn new(registry: Registry) -> Self {
        Self { registry: Arc::new(registry) }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn source(&self, source_id: &str) -> Result<&SourceHandle> {
        self.registry.get(source_id).ok_or_raise(|| ErrorKind::UnknownSource(source_id.to_string()))
    }

    /// Whether the source exposes an optional capability.
    pub fn supports(&self, source_id: &str, capability: Capability) -> Result<bool> {
        Ok(self.source(source_id)?.supports(capability))
    }

    /// Fetch a novel's metadata and chapter list.
    ///
    /// Blank optional fields are normalized to `None` and a relative cover is
    /// resolved against the source.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_novel(&self, source_id: &str, path: &str) -> Result<NovelSnapshot> {
        let source = self.source(source_id)?;
        let novel = source.fetch_novel(path).await.or_raise(|| fetch_error(source_id, Operation::FetchNovel))?;
        tracing::debug!(chapters = novel.chapters.len(), "fetched novel");
        Ok(normalize(source.as_ref(), novel))
    }

    /// Fetch the body of a chapter.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_chapter_text(&self, source_id: &str, path: &str) -> Result<String> {
        let source = self.source(source_id)?;
        source.fetch_chapter(path).await.or_raise(|| fetch_error(source_id, Operation::FetchChapter))
    }

    /// Fetch only the chapter list of a novel.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_chapter_list(&self, source_id: &str, path: &str) -> Result<Vec<ChapterSnapshot>> {
        let source = self.source(source_id)?;
        let novel = source.fetch_novel(path).await.or_raise(|| fetch_error(source_id, Operation::FetchChapterList))?;
        Ok(novel.chapters.into_iter().map(normalize_chapter).collect())
    }

    /// Fetch image bytes; `Ok(None)` means the source had nothing to offer.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_image(&self, source_id: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let source = self.source(source_id)?;
        let images = source.images().ok_or_raise(|| unsupported(source_id, Operation::FetchImage))?;
        images.fetch_image(url).await.or_raise(|| fetch_error(source_id, Operation::FetchImage))
    }

    /// Fetch one page of a paginated chapter list.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_page(&self, source_id: &str, path: &str, page: &str) -> Result<PageSnapshot> {
        let source = self.source(source_id)?;
        let pages = source.pages().ok_or_raise(|| unsupported(source_id, Operation::FetchPage))?;
        let mut snapshot =
            pages.fetch_page(path, page).await.or_raise(|| fetch_error(source_id, Operation::FetchPage))?;
        snapshot.chapters = snapshot.chapters.into_iter().map(normalize_chapter).collect();
        Ok(snapshot)
    }

    /// Turn a source-relative path into an absolute URL.
    ///
    /// Never fails: absolute input is returned unchanged, and an unknown
    /// source or a failing resolver yields the original path.
    pub fn resolve_url(&self, source_id: &str, path: &str, is_novel: bool) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }
        match self.registry.get(source_id) {
            Some(source) => resolve_with(source.as_ref(), path, is_novel),
            None => {
                tracing::debug!(source = %source_id, path, "cannot resolve url for unknown source");
                path.to_string()
            },
        }
    }
}

fn resolve_with(source: &dyn ContentSource, path: &str, is_novel: bool) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    match source.resolver() {
        Some(resolver) => resolver.resolve_url(path, is_novel).unwrap_or_else(|err| {
            tracing::debug!(source = %source.id(), path, error = ?err, "resolver failed, keeping path");
            path.to_string()
        }),
        None => join_site(source.site(), path),
    }
}

fn normalize(source: &dyn ContentSource, mut novel: NovelSnapshot) -> NovelSnapshot {
    novel.cover = non_blank(novel.cover).map(|cover| resolve_with(source, &cover, false));
    novel.summary = non_blank(novel.summary);
    novel.author = non_blank(novel.author);
    novel.artist = non_blank(novel.artist);
    novel.genres.retain(|genre| !genre.trim().is_empty());
    novel.chapters = novel.chapters.into_iter().map(normalize_chapter).collect();
    novel.latest_chapter = novel.latest_chapter.map(normalize_chapter);
    novel
}

fn normalize_chapter(mut chapter: ChapterSnapshot) -> ChapterSnapshot {
    chapter.release_time = non_blank(chapter.release_time);
    chapter.page = non_blank(chapter.page);
    chapter
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn fetch_error(source_id: &str, operation: Operation) -> ErrorKind {
    ErrorKind::Fetch { source_id: source_id.to_string(), operation }
}

fn unsupported(source_id: &str, operation: Operation) -> ErrorKind {
    ErrorKind::UnsupportedOperation { source_id: source_id.to_string(), operation }
}
