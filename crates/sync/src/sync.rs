//! The per-novel sync cycle.

use crate::buster::CacheBuster;
use crate::download::{ChapterDownloader, DownloaderHandle, StorageDownloader};
use crate::error::{Error, ErrorKind, Result};
use crate::options::SyncOptions;
use crate::reconcile::reconcile;
use crate::updates::invalidate_has_updates;
use derive_more::Display;
use exn::ResultExt;
use std::path::PathBuf;
use std::sync::Arc;
use tome_config::Config;
use tome_db::{
    ChapterOrder, Database, InsertedChapter, KeyValueHandle, Novel, NovelId, NovelMetadata, Repository, SqliteStore,
};
use tome_source::error::ErrorKind as SourceErrorKind;
use tome_source::{Capability, Gateway, LOCAL_SOURCE_ID, NovelSnapshot};
use tome_storage::backend::LocalBackend;
use tome_storage::{BackendHandle, segment};
use tracing::instrument;

/// Stages of one sync cycle, in the order they are entered.
///
/// Optional stages are skipped when not requested or when there is nothing
/// to do. A failure moves the cycle to [`Failed`](Self::Failed) from the stage
/// it happened in; stages that already committed stay committed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    #[display("start")]
    Start,
    #[display("fetch snapshot")]
    FetchSnapshot,
    #[display("metadata refresh")]
    MetadataRefresh,
    #[display("reconcile")]
    Reconcile,
    #[display("apply change-set")]
    ApplyChangeSet,
    #[display("trigger downloads")]
    TriggerDownloads,
    #[display("invalidate update flags")]
    InvalidateUpdateFlags,
    #[display("done")]
    Done,
    #[display("failed")]
    Failed,
}
impl SyncStage {
    /// `Done` and `Failed` end a cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// A chapter whose automatic download failed. The sync itself went on.
#[derive(Debug)]
pub struct DownloadFailure {
    pub chapter: InsertedChapter,
    pub error: Error,
}

/// What one sync cycle did.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub novel_id: NovelId,
    /// The novel belongs to the local pseudo-source; nothing was done.
    pub skipped: bool,
    pub metadata_refreshed: bool,
    /// Chapters that did not exist before this cycle.
    pub inserted: Vec<InsertedChapter>,
    pub updated: usize,
    pub downloaded: usize,
    pub download_failures: Vec<DownloadFailure>,
    /// The cached "has updates" flags were raised.
    pub updates_invalidated: bool,
}
impl SyncReport {
    fn new(novel_id: NovelId) -> Self {
        Self { novel_id, ..Default::default() }
    }
}

/// Drives sync cycles for novels of the library.
///
/// # Cycle
///
/// 1. Novels of the [local pseudo-source](LOCAL_SOURCE_ID) are skipped.
/// 2. A fresh snapshot is fetched through the [`Gateway`].
/// 3. With a metadata refresh, the cover is cached and every metadata field
///    is written in one transaction. Otherwise only a non-zero page count is.
/// 4. The snapshot's chapters are [reconciled](reconcile) with the persisted
///    ones and the change-set is applied in a second transaction.
/// 5. Newly inserted chapters are downloaded when requested; each failure is
///    reported without stopping the others.
/// 6. Cached "has updates" flags are raised if the latest chapter changed.
///
/// Different novels may sync concurrently. Concurrent cycles for the same
/// novel are not serialized and must be avoided by the caller.
pub struct Synchronizer {
    gateway: Gateway,
    repo: Repository,
    storage: BackendHandle,
    kv: KeyValueHandle,
    downloader: DownloaderHandle,
    buster: CacheBuster,
}

impl Synchronizer {
    pub fn new(gateway: Gateway, repo: Repository, storage: BackendHandle, kv: KeyValueHandle) -> Self {
        let downloader = Arc::new(StorageDownloader::new(gateway.clone(), repo.clone(), storage.clone()));
        Self { gateway, repo, storage, kv, downloader, buster: CacheBuster::new() }
    }

    /// Open the database and file cache named by `config`.
    pub async fn open(config: &Config, gateway: Gateway) -> Result<Self> {
        let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Persistence)?;
        let storage = LocalBackend::new("downloads", &config.storage).or_raise(|| ErrorKind::FileSystem)?;
        tracing::info!(database = %config.database.display(), storage = %config.storage.display(), "library opened");
        Ok(Self::new(gateway, Repository::from(&db), Arc::new(storage), Arc::new(SqliteStore::from(&db))))
    }

    /// Replace the default [`StorageDownloader`].
    pub fn with_downloader(mut self, downloader: impl ChapterDownloader + 'static) -> Self {
        self.downloader = Arc::new(downloader);
        self
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Sync a persisted novel.
    pub async fn sync(&self, novel: &Novel, options: &SyncOptions) -> Result<SyncReport> {
        self.sync_novel(&novel.source_id, &novel.path, novel.id, options).await
    }

    /// Run one sync cycle for the novel `novel_id`, found at `path` on `source_id`.
    #[instrument(skip(self, path, options), fields(path = %path))]
    pub async fn sync_novel(
        &self,
        source_id: &str,
        path: &str,
        novel_id: NovelId,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::new(novel_id);
        if source_id == LOCAL_SOURCE_ID {
            tracing::debug!("local novel, nothing to sync");
            report.skipped = true;
            return Ok(report);
        }
        let mut stage = SyncStage::Start;
        match self.run(source_id, path, novel_id, options, &mut stage, &mut report).await {
            Ok(()) => {
                enter(&mut stage, SyncStage::Done);
                tracing::info!(
                    inserted = report.inserted.len(),
                    updated = report.updated,
                    download_failures = report.download_failures.len(),
                    "novel synced"
                );
                Ok(report)
            },
            Err(err) => {
                let failed_in = fail(&mut stage);
                tracing::warn!(stage = %failed_in, error = ?err, "sync failed");
                Err(err)
            },
        }
    }

    async fn run(
        &self,
        source_id: &str,
        path: &str,
        novel_id: NovelId,
        options: &SyncOptions,
        stage: &mut SyncStage,
        report: &mut SyncReport,
    ) -> Result<()> {
        enter(stage, SyncStage::FetchSnapshot);
        let snapshot = match self.gateway.fetch_novel(source_id, path).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                let kind = match &*err {
                    SourceErrorKind::UnknownSource(id) => ErrorKind::UnknownSource(id.clone()),
                    _ => ErrorKind::Fetch,
                };
                return Err(err).or_raise(|| kind);
            },
        };

        if options.refresh_metadata {
            enter(stage, SyncStage::MetadataRefresh);
            self.refresh_metadata(source_id, novel_id, &snapshot).await?;
            report.metadata_refreshed = true;
        } else if snapshot.total_pages > 0 {
            self.repo.update_total_pages(novel_id, snapshot.total_pages).await.or_raise(|| ErrorKind::Persistence)?;
        }

        enter(stage, SyncStage::Reconcile);
        let persisted =
            self.repo.list_chapters(novel_id, ChapterOrder::PositionAsc).await.or_raise(|| ErrorKind::Persistence)?;
        let changes = reconcile(novel_id, &persisted, &snapshot.chapters);

        enter(stage, SyncStage::ApplyChangeSet);
        let applied = self.repo.apply_changes(novel_id, &changes).await.or_raise(|| ErrorKind::Persistence)?;
        report.inserted = applied.inserted;
        report.updated = applied.updated;

        if options.download_new_chapters && !report.inserted.is_empty() {
            enter(stage, SyncStage::TriggerDownloads);
            for chapter in &report.inserted {
                match self.downloader.download(source_id, novel_id, chapter).await {
                    Ok(()) => report.downloaded += 1,
                    Err(error) => {
                        tracing::warn!(
                            chapter_id = chapter.id,
                            path = %chapter.path,
                            ?error,
                            "chapter download failed"
                        );
                        report.download_failures.push(DownloadFailure { chapter: chapter.clone(), error });
                    },
                }
            }
        }

        if snapshot.latest_chapter.is_some() {
            enter(stage, SyncStage::InvalidateUpdateFlags);
            report.updates_invalidated =
                invalidate_has_updates(self.kv.as_ref(), novel_id, snapshot.latest_chapter.as_ref()).await?;
        }
        Ok(())
    }

    /// Cache the cover, then write every metadata field in one transaction.
    async fn refresh_metadata(&self, source_id: &str, novel_id: NovelId, snapshot: &NovelSnapshot) -> Result<()> {
        let cover = match snapshot.cover.as_deref() {
            Some(url) => Some(self.cache_cover(source_id, novel_id, url).await?),
            None => None,
        };
        let metadata = NovelMetadata::from(snapshot).with_cover(cover);
        self.repo.update_metadata(novel_id, &metadata).await.or_raise(|| ErrorKind::Persistence)
    }

    /// Store the cover image in the file cache and return the URI to persist.
    ///
    /// When the source cannot serve images, or serves nothing for this URL,
    /// the remote URL is kept as is.
    async fn cache_cover(&self, source_id: &str, novel_id: NovelId, url: &str) -> Result<String> {
        if !self.gateway.supports(source_id, Capability::Images).or_raise(|| ErrorKind::Fetch)? {
            return Ok(url.to_string());
        }
        let dir = novel_dir(source_id, novel_id)?;
        if !self.storage.exists(&dir).await.or_raise(|| ErrorKind::FileSystem)? {
            self.storage.create_dir(&dir).await.or_raise(|| ErrorKind::FileSystem)?;
        }
        let Some(bytes) = self.gateway.fetch_image(source_id, url).await.or_raise(|| ErrorKind::Fetch)? else {
            tracing::debug!(url, "source returned no cover image");
            return Ok(url.to_string());
        };
        let file = dir.join("cover.png");
        self.storage.write(&file, &bytes).await.or_raise(|| ErrorKind::FileSystem)?;
        let uri = self.storage.uri(&file).or_raise(|| ErrorKind::FileSystem)?;
        Ok(format!("{uri}?{}", self.buster.next()))
    }
}

fn enter(stage: &mut SyncStage, next: SyncStage) {
    tracing::debug!(from = %stage, to = %next, "sync stage");
    *stage = next;
}

/// Move to [`SyncStage::Failed`], returning the stage the failure happened in.
fn fail(stage: &mut SyncStage) -> SyncStage {
    let failed_in = *stage;
    enter(stage, SyncStage::Failed);
    failed_in
}

fn novel_dir(source_id: &str, novel_id: NovelId) -> Result<PathBuf> {
    let source = segment(source_id).or_raise(|| ErrorKind::FileSystem)?;
    Ok(PathBuf::from(source).join(novel_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::{latest_chapter_key, page_updates_key};
    use rstest::rstest;
    use tome_db::{DEFAULT_AUTHOR, KeyValueExt, MemoryStore};
    use tome_source::mock::MockSource;
    use tome_source::{ChapterSnapshot, Operation, ProviderErrorKind, Registry};
    use tome_storage::StorageBackend;
    use tome_storage::backend::MockBackend;

    const COVER_URL: &str = "https://src.test/covers/n.jpg";

    struct Fixture {
        _db: Database,
        repo: Repository,
        source: MockSource,
        storage: Arc<MockBackend>,
        kv: Arc<MemoryStore>,
        sync: Synchronizer,
    }

    async fn fixture(source: MockSource) -> Fixture {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let storage = Arc::new(MockBackend::default());
        let kv = Arc::new(MemoryStore::new());
        let gateway = Gateway::new(Registry::new().with(source.clone()));
        let sync = Synchronizer::new(gateway, repo.clone(), storage.clone(), kv.clone());
        Fixture { _db: db, repo, source, storage, kv, sync }
    }

    fn snapshot(chapters: &[(&str, &str)]) -> NovelSnapshot {
        NovelSnapshot {
            path: "/n".to_string(),
            name: "A Novel".to_string(),
            chapters: chapters.iter().map(|(path, name)| ChapterSnapshot::new(*path, *name)).collect(),
            ..Default::default()
        }
    }

    async fn add_novel(fixture: &Fixture) -> Novel {
        fixture.repo.insert_novel("src", &snapshot(&[])).await.unwrap()
    }

    async fn chapter_names(fixture: &Fixture, novel_id: NovelId) -> Vec<(String, String, u32)> {
        fixture
            .repo
            .list_chapters(novel_id, ChapterOrder::PositionAsc)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.path, c.name, c.position))
            .collect()
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut stage = SyncStage::ApplyChangeSet;
        assert!(!stage.is_terminal());
        assert_eq!(fail(&mut stage), SyncStage::ApplyChangeSet);
        assert_eq!(stage, SyncStage::Failed);
        assert!(stage.is_terminal());
        assert!(SyncStage::Done.is_terminal());
    }

    #[tokio::test]
    async fn test_local_source_is_noop() {
        let fixture = fixture(MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1")]))).await;
        let novel = add_novel(&fixture).await;
        let options = SyncOptions::default().with_metadata_refresh(true).with_downloads(true);
        let report = fixture.sync.sync_novel(LOCAL_SOURCE_ID, "/n", novel.id, &options).await.unwrap();
        assert!(report.skipped);
        assert_eq!(fixture.source.calls().total(), 0);
        assert!(chapter_names(&fixture, novel.id).await.is_empty());
        assert!(fixture.storage.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_fails_before_fetch() {
        let fixture = fixture(MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1")]))).await;
        let novel = add_novel(&fixture).await;
        let err = fixture.sync.sync_novel("nope", "/n", novel.id, &SyncOptions::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownSource(id) if id == "nope"));
        assert_eq!(fixture.source.calls().total(), 0);
        assert!(chapter_names(&fixture, novel.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_first_sync_then_idempotent() {
        let fixture = fixture(MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1"), ("/c2", "Ch2")]))).await;
        let novel = add_novel(&fixture).await;

        let report = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        assert_eq!(report.inserted.len(), 2);
        assert_eq!(report.updated, 0);
        assert!(!report.skipped);
        assert_eq!(
            chapter_names(&fixture, novel.id).await,
            vec![("/c1".to_string(), "Ch1".to_string(), 0), ("/c2".to_string(), "Ch2".to_string(), 1)]
        );

        let report = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        assert!(report.inserted.is_empty());
        assert_eq!(report.updated, 0);
        assert_eq!(chapter_names(&fixture, novel.id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_drift_updates_and_never_deletes() {
        let fixture = fixture(MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1"), ("/c2", "Ch2")]))).await;
        let novel = add_novel(&fixture).await;
        fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();

        // "/c1" renamed, "/c2" gone, "/c3" new at the front.
        fixture.source.set_novel(snapshot(&[("/c3", "Ch3"), ("/c1", "Ch1 Revised")]));
        let report = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        assert_eq!(report.inserted.iter().map(|c| c.path.as_str()).collect::<Vec<_>>(), vec!["/c3"]);
        assert_eq!(report.updated, 1);
        assert_eq!(
            chapter_names(&fixture, novel.id).await,
            vec![
                ("/c3".to_string(), "Ch3".to_string(), 0),
                ("/c1".to_string(), "Ch1 Revised".to_string(), 1),
                ("/c2".to_string(), "Ch2".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_metadata_refresh_caches_cover() {
        let mut novel_snapshot = snapshot(&[("/c1", "Ch1")]);
        novel_snapshot.name = "Renamed Novel".to_string();
        novel_snapshot.cover = Some(COVER_URL.to_string());
        novel_snapshot.genres = vec!["Fantasy".to_string()];
        novel_snapshot.total_pages = 2;
        let source = MockSource::new("src").with_novel(novel_snapshot).with_image(COVER_URL, b"png".to_vec());
        let fixture = fixture(source).await;
        let novel = add_novel(&fixture).await;
        let options = SyncOptions::default().with_metadata_refresh(true);

        let report = fixture.sync.sync(&novel, &options).await.unwrap();
        assert!(report.metadata_refreshed);
        let cover_file = PathBuf::from("src").join(novel.id.to_string()).join("cover.png");
        assert_eq!(fixture.storage.read(&cover_file).await.unwrap(), b"png");

        let stored = fixture.repo.get_novel(novel.id).await.unwrap().unwrap();
        let first_cover = stored.cover.unwrap();
        assert!(first_cover.starts_with(&format!("mock://src/{}/cover.png?", novel.id)));
        assert_eq!(stored.name, "Renamed Novel");
        assert_eq!(stored.author.as_deref(), Some(DEFAULT_AUTHOR));
        assert_eq!(stored.genres, vec!["Fantasy".to_string()]);
        assert_eq!(stored.total_pages, 2);

        fixture.sync.sync(&novel, &options).await.unwrap();
        let second_cover = fixture.repo.get_novel(novel.id).await.unwrap().unwrap().cover.unwrap();
        assert_ne!(first_cover, second_cover);
    }

    #[rstest]
    #[case::no_capability(MockSource::new("src"))]
    #[case::no_bytes(MockSource::new("src").with_images())]
    #[tokio::test]
    async fn test_cover_without_image_keeps_remote_url(#[case] source: MockSource) {
        let mut novel_snapshot = snapshot(&[]);
        novel_snapshot.cover = Some(COVER_URL.to_string());
        let fixture = fixture(source.with_novel(novel_snapshot)).await;
        let novel = add_novel(&fixture).await;
        fixture.sync.sync(&novel, &SyncOptions::default().with_metadata_refresh(true)).await.unwrap();
        let stored = fixture.repo.get_novel(novel.id).await.unwrap().unwrap();
        assert_eq!(stored.cover.as_deref(), Some(COVER_URL));
        assert!(fixture.storage.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_cover_write_failure_aborts_before_metadata() {
        let mut novel_snapshot = snapshot(&[("/c1", "Ch1")]);
        novel_snapshot.name = "Renamed Novel".to_string();
        novel_snapshot.cover = Some(COVER_URL.to_string());
        let source = MockSource::new("src").with_novel(novel_snapshot).with_image(COVER_URL, b"png".to_vec());
        let fixture = fixture(source).await;
        let novel = add_novel(&fixture).await;
        fixture.storage.fail_writes(true);

        let options = SyncOptions::default().with_metadata_refresh(true);
        let err = fixture.sync.sync(&novel, &options).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileSystem));
        assert_eq!(fixture.repo.get_novel(novel.id).await.unwrap().unwrap().name, "A Novel");
        assert!(chapter_names(&fixture, novel.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_total_pages_without_refresh() {
        let mut novel_snapshot = snapshot(&[]);
        novel_snapshot.name = "Renamed Novel".to_string();
        novel_snapshot.total_pages = 3;
        let fixture = fixture(MockSource::new("src").with_novel(novel_snapshot)).await;
        let novel = add_novel(&fixture).await;
        fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        let stored = fixture.repo.get_novel(novel.id).await.unwrap().unwrap();
        assert_eq!(stored.total_pages, 3);
        assert_eq!(stored.name, "A Novel");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_cycle() {
        let source = MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1")]));
        source.fail(Operation::FetchNovel, ProviderErrorKind::Transport("offline".to_string()));
        let fixture = fixture(source).await;
        let novel = add_novel(&fixture).await;
        let err = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch));
        assert!(err.is_retryable());
        assert!(chapter_names(&fixture, novel.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_download_failures_are_isolated() {
        let source = MockSource::new("src")
            .with_novel(snapshot(&[("/c1", "Ch1"), ("/c2", "Ch2"), ("/c3", "Ch3")]))
            .with_chapter("/c1", "<p>One</p>")
            .with_chapter("/c3", "<p>Three</p>");
        let fixture = fixture(source).await;
        let novel = add_novel(&fixture).await;

        let report = fixture.sync.sync(&novel, &SyncOptions::default().with_downloads(true)).await.unwrap();
        assert_eq!(report.inserted.len(), 3);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.download_failures.len(), 1);
        assert_eq!(report.download_failures[0].chapter.path, "/c2");
        assert!(matches!(&*report.download_failures[0].error, ErrorKind::Fetch));

        let chapters = fixture.repo.list_chapters(novel.id, ChapterOrder::PositionAsc).await.unwrap();
        let downloaded: Vec<_> = chapters.iter().map(|c| c.is_downloaded).collect();
        assert_eq!(downloaded, vec![true, false, true]);
        assert_eq!(fixture.storage.paths().await.len(), 2);
    }

    #[tokio::test]
    async fn test_no_downloads_unless_requested() {
        let source = MockSource::new("src").with_novel(snapshot(&[("/c1", "Ch1")])).with_chapter("/c1", "text");
        let fixture = fixture(source).await;
        let novel = add_novel(&fixture).await;
        let report = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        assert_eq!(report.downloaded, 0);
        assert_eq!(fixture.source.calls().count(Operation::FetchChapter), 0);
    }

    #[tokio::test]
    async fn test_latest_chapter_change_invalidates_flags() {
        let mut novel_snapshot = snapshot(&[("/c1", "Ch1"), ("/c2", "Ch2")]);
        novel_snapshot.latest_chapter = Some(ChapterSnapshot::new("/c2", "Ch2"));
        let fixture = fixture(MockSource::new("src")).await;
        // Make the synced novel the seventh row.
        let mut novel = add_novel(&fixture).await;
        for i in 2..=7 {
            let mut other = snapshot(&[]);
            other.path = format!("/n{i}");
            novel = fixture.repo.insert_novel("src", &other).await.unwrap();
        }
        assert_eq!(novel.id, 7);
        novel_snapshot.path = novel.path.clone();
        fixture.source.set_novel(novel_snapshot);

        fixture.kv.set(&latest_chapter_key(7), &ChapterSnapshot::new("/c1", "Ch1")).await.unwrap();
        fixture.kv.set(&page_updates_key(7), &[false, true]).await.unwrap();

        let report = fixture.sync.sync(&novel, &SyncOptions::default()).await.unwrap();
        assert!(report.updates_invalidated);
        assert_eq!(fixture.kv.get::<Vec<bool>>(&page_updates_key(7)).await.unwrap(), Some(vec![true, true]));
        // The remembered latest chapter belongs to the presentation layer.
        let remembered: ChapterSnapshot = fixture.kv.get(&latest_chapter_key(7)).await.unwrap().unwrap();
        assert_eq!(remembered.path, "/c1");
    }

    #[tokio::test]
    async fn test_open_creates_fresh_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::rooted_at(dir.path().join("fresh"));
        let sync = Synchronizer::open(&config, Gateway::new(Registry::new())).await.unwrap();
        assert!(config.database.exists());
        assert!(config.storage.is_dir());
        assert!(sync.repository().list_library_novels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::rooted_at(dir.path());
        let mut novel_snapshot = snapshot(&[("/c1", "Ch1")]);
        novel_snapshot.cover = Some(COVER_URL.to_string());
        let source = MockSource::new("src")
            .with_novel(novel_snapshot)
            .with_image(COVER_URL, b"png".to_vec())
            .with_chapter("/c1", "<p>One</p>");
        let sync = Synchronizer::open(&config, Gateway::new(Registry::new().with(source))).await.unwrap();
        let novel = sync.repository().insert_novel("src", &snapshot(&[])).await.unwrap();
        let options = SyncOptions::default().with_metadata_refresh(true).with_downloads(true);
        let report = sync.sync(&novel, &options).await.unwrap();
        assert_eq!(report.downloaded, 1);

        let novel_dir = config.storage.join("src").join(novel.id.to_string());
        assert_eq!(std::fs::read(novel_dir.join("cover.png")).unwrap(), b"png");
        let chapter_id = report.inserted[0].id;
        let chapter = std::fs::read_to_string(novel_dir.join(chapter_id.to_string()).join("index.html")).unwrap();
        assert_eq!(chapter, "<p>One</p>");
        let cover = sync.repository().get_novel(novel.id).await.unwrap().unwrap().cover.unwrap();
        assert!(cover.starts_with("file://"));
        assert!(config.database.exists());
    }
}
