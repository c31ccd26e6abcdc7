//! The content source plugin contract.

use crate::error::ProviderResult;
use crate::models::{NovelSnapshot, PageSnapshot};
use async_trait::async_trait;
use derive_more::Display;

/// Gateway operations, used to label errors and log records.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    #[display("fetch novel")]
    FetchNovel,
    #[display("fetch chapter")]
    FetchChapter,
    #[display("fetch chapter list")]
    FetchChapterList,
    #[display("fetch image")]
    FetchImage,
    #[display("fetch page")]
    FetchPage,
    #[display("resolve url")]
    ResolveUrl,
}

/// Optional capabilities a source may expose.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    #[display("images")]
    Images,
    #[display("pages")]
    Pages,
    #[display("url resolution")]
    UrlResolution,
}

/// A remote catalog of novels, adapted into the normalized snapshot shape.
///
/// Fetching novel details and chapter text is mandatory. Everything else is
/// an optional capability, discovered through the query methods
/// ([`images`](Self::images), [`pages`](Self::pages),
/// [`resolver`](Self::resolver)) which return `None` unless overridden.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use tome_source::{ContentSource, ImageSource, NovelSnapshot, ProviderResult};
///
/// struct Example;
///
/// #[async_trait]
/// impl ContentSource for Example {
///     fn id(&self) -> &str { "example" }
///     fn site(&self) -> &str { "https://example.com" }
///     async fn fetch_novel(&self, path: &str) -> ProviderResult<NovelSnapshot> {
///         Ok(NovelSnapshot { path: path.to_string(), name: "Example".to_string(), ..Default::default() })
///     }
///     async fn fetch_chapter(&self, _path: &str) -> ProviderResult<String> {
///         Ok("<p>Once upon a time</p>".to_string())
///     }
///     fn images(&self) -> Option<&dyn ImageSource> { Some(self) }
/// }
///
/// #[async_trait]
/// impl ImageSource for Example {
///     async fn fetch_image(&self, _url: &str) -> ProviderResult<Option<Vec<u8>>> {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Identifier the source is registered under.
    fn id(&self) -> &str;

    /// Base site URL, used to absolutize relative paths when the source has
    /// no [`UrlResolver`].
    fn site(&self) -> &str;

    /// Fetch a novel's metadata and full chapter list.
    async fn fetch_novel(&self, path: &str) -> ProviderResult<NovelSnapshot>;

    /// Fetch the body of a chapter.
    async fn fetch_chapter(&self, path: &str) -> ProviderResult<String>;

    fn images(&self) -> Option<&dyn ImageSource> {
        None
    }

    fn pages(&self) -> Option<&dyn PageSource> {
        None
    }

    fn resolver(&self) -> Option<&dyn UrlResolver> {
        None
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Images => self.images().is_some(),
            Capability::Pages => self.pages().is_some(),
            Capability::UrlResolution => self.resolver().is_some(),
        }
    }
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetch image bytes. `Ok(None)` means the source has nothing to offer,
    /// which is not an error.
    async fn fetch_image(&self, url: &str) -> ProviderResult<Option<Vec<u8>>>;
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of a paginated chapter list.
    async fn fetch_page(&self, path: &str, page: &str) -> ProviderResult<PageSnapshot>;
}

pub trait UrlResolver: Send + Sync {
    /// Turn a source-relative path into an absolute URL.
    fn resolve_url(&self, path: &str, is_novel: bool) -> ProviderResult<String>;
}
