//! Scriptable content source for testing.

use crate::error::{ProviderErrorKind, ProviderResult};
use crate::{ContentSource, ImageSource, NovelSnapshot, Operation, PageSnapshot, PageSource, UrlResolver};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ResolveFn = dyn Fn(&str, bool) -> ProviderResult<String> + Send + Sync;

/// Scriptable content source for testing.
///
/// Clones share state, so a test can register one clone in a
/// [`Registry`](crate::Registry) and keep another to change the remote
/// catalog between sync cycles, inject failures, or count calls.
///
/// Optional capabilities are off until enabled with [`with_images`],
/// [`with_pages`] or [`with_resolver`].
///
/// [`with_images`]: Self::with_images
/// [`with_pages`]: Self::with_pages
/// [`with_resolver`]: Self::with_resolver
#[derive(Clone)]
pub struct MockSource {
    id: String,
    site: String,
    state: Arc<RwLock<State>>,
    calls: CallLog,
    resolver: Option<Arc<ResolveFn>>,
}

#[derive(Default)]
struct State {
    novels: HashMap<String, NovelSnapshot>,
    chapters: HashMap<String, String>,
    images: Option<HashMap<String, Vec<u8>>>,
    pages: Option<HashMap<(String, String), PageSnapshot>>,
    failures: HashMap<Operation, ProviderErrorKind>,
}

/// Per-operation call counts, shared between clones of a [`MockSource`].
#[derive(Clone, Default)]
pub struct CallLog(Arc<RwLock<HashMap<Operation, usize>>>);
impl CallLog {
    pub fn count(&self, operation: Operation) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).get(&operation).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).values().sum()
    }

    fn record(&self, operation: Operation) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner).entry(operation).or_default() += 1;
    }
}

impl MockSource {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            site: format!("https://{id}.test"),
            id,
            state: Arc::default(),
            calls: CallLog::default(),
            resolver: None,
        }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    pub fn with_novel(self, novel: NovelSnapshot) -> Self {
        self.set_novel(novel);
        self
    }

    pub fn with_chapter(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.write().chapters.insert(path.into(), text.into());
        self
    }

    /// Enable the image capability (with no images yet).
    pub fn with_images(self) -> Self {
        self.write().images.get_or_insert_default();
        self
    }

    /// Serve `bytes` for `url`, enabling the image capability.
    pub fn with_image(self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.write().images.get_or_insert_default().insert(url.into(), bytes);
        self
    }

    /// Serve a chapter-list page, enabling the page capability.
    pub fn with_page(self, path: impl Into<String>, page: impl Into<String>, snapshot: PageSnapshot) -> Self {
        self.write().pages.get_or_insert_default().insert((path.into(), page.into()), snapshot);
        self
    }

    pub fn with_pages(self) -> Self {
        self.write().pages.get_or_insert_default();
        self
    }

    pub fn with_resolver(
        mut self,
        resolve: impl Fn(&str, bool) -> ProviderResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(Arc::new(resolve));
        self
    }

    /// Replace the snapshot served for the novel's path.
    pub fn set_novel(&self, novel: NovelSnapshot) {
        self.write().novels.insert(novel.path.clone(), novel);
    }

    /// Make every subsequent call of `operation` fail with `kind`.
    pub fn fail(&self, operation: Operation, kind: ProviderErrorKind) {
        self.write().failures.insert(operation, kind);
    }

    pub fn clear_failures(&self) {
        self.write().failures.clear();
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, operation: Operation) -> ProviderResult<()> {
        self.calls.record(operation);
        match self.read().failures.get(&operation) {
            Some(kind) => Err(exn::Exn::from(kind.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentSource for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn site(&self) -> &str {
        &self.site
    }

    async fn fetch_novel(&self, path: &str) -> ProviderResult<NovelSnapshot> {
        self.begin(Operation::FetchNovel)?;
        let novel = self.read().novels.get(path).cloned();
        novel.ok_or_else(|| exn::Exn::from(ProviderErrorKind::Transport(format!("404: {path}"))))
    }

    async fn fetch_chapter(&self, path: &str) -> ProviderResult<String> {
        self.begin(Operation::FetchChapter)?;
        let text = self.read().chapters.get(path).cloned();
        text.ok_or_else(|| exn::Exn::from(ProviderErrorKind::Transport(format!("404: {path}"))))
    }

    fn images(&self) -> Option<&dyn ImageSource> {
        self.read().images.is_some().then_some(self as &dyn ImageSource)
    }

    fn pages(&self) -> Option<&dyn PageSource> {
        self.read().pages.is_some().then_some(self as &dyn PageSource)
    }

    fn resolver(&self) -> Option<&dyn UrlResolver> {
        self.resolver.is_some().then_some(self as &dyn UrlResolver)
    }
}

#[async_trait]
impl ImageSource for MockSource {
    async fn fetch_image(&self, url: &str) -> ProviderResult<Option<Vec<u8>>> {
        self.begin(Operation::FetchImage)?;
        Ok(self.read().images.as_ref().and_then(|images| images.get(url).cloned()))
    }
}

#[async_trait]
impl PageSource for MockSource {
    async fn fetch_page(&self, path: &str, page: &str) -> ProviderResult<PageSnapshot> {
        self.begin(Operation::FetchPage)?;
        let key = (path.to_string(), page.to_string());
        let snapshot = self.read().pages.as_ref().and_then(|pages| pages.get(&key).cloned());
        snapshot.ok_or_else(|| exn::Exn::from(ProviderErrorKind::Transport(format!("404: {path} page {page}"))))
    }
}

impl UrlResolver for MockSource {
    fn resolve_url(&self, path: &str, is_novel: bool) -> ProviderResult<String> {
        self.calls.record(Operation::ResolveUrl);
        match &self.resolver {
            Some(resolve) => resolve(path, is_novel),
            None => Ok(path.to_string()),
        }
    }
}
