//! Chapter downloads triggered by newly discovered chapters.

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::PathBuf;
use std::sync::Arc;
use tome_db::{ChapterId, InsertedChapter, NovelId, Repository};
use tome_source::Gateway;
use tome_storage::{BackendHandle, segment};
use tracing::instrument;

pub type DownloaderHandle = Arc<dyn ChapterDownloader>;

/// Downloads one chapter so it can be read offline.
#[async_trait]
pub trait ChapterDownloader: Send + Sync {
    async fn download(&self, source_id: &str, novel_id: NovelId, chapter: &InsertedChapter) -> Result<()>;
}

/// Stores chapter bodies in the file cache as
/// `{source_id}/{novel_id}/{chapter_id}/index.html` and flags the chapter as
/// downloaded.
#[derive(Clone)]
pub struct StorageDownloader {
    gateway: Gateway,
    repo: Repository,
    storage: BackendHandle,
}
impl StorageDownloader {
    pub fn new(gateway: Gateway, repo: Repository, storage: BackendHandle) -> Self {
        Self { gateway, repo, storage }
    }
}

/// Location of a downloaded chapter inside the file cache.
pub fn chapter_file(source_id: &str, novel_id: NovelId, chapter_id: ChapterId) -> Result<PathBuf> {
    let source = segment(source_id).or_raise(|| ErrorKind::FileSystem)?;
    Ok(PathBuf::from(source).join(novel_id.to_string()).join(chapter_id.to_string()).join("index.html"))
}

#[async_trait]
impl ChapterDownloader for StorageDownloader {
    #[instrument(level = "debug", skip(self, chapter), fields(chapter_id = chapter.id, path = %chapter.path))]
    async fn download(&self, source_id: &str, novel_id: NovelId, chapter: &InsertedChapter) -> Result<()> {
        let file = chapter_file(source_id, novel_id, chapter.id)?;
        let text =
            self.gateway.fetch_chapter_text(source_id, &chapter.path).await.or_raise(|| ErrorKind::Fetch)?;
        self.storage.write(&file, text.as_bytes()).await.or_raise(|| ErrorKind::FileSystem)?;
        self.repo.mark_downloaded(chapter.id, true).await.or_raise(|| ErrorKind::Persistence)?;
        tracing::debug!(file = %file.display(), bytes = text.len(), "chapter downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tome_db::{Change, ChangeSet, Database};
    use tome_source::mock::MockSource;
    use tome_source::{ChapterSnapshot, NovelSnapshot, Registry};
    use tome_storage::StorageBackend;
    use tome_storage::backend::MockBackend;

    #[test]
    fn test_chapter_file() {
        assert_eq!(chapter_file("src", 7, 42).unwrap(), Path::new("src/7/42/index.html"));
        let err = chapter_file("../src", 7, 42).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileSystem));
    }

    #[tokio::test]
    async fn test_download_writes_and_marks() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let novel = repo
            .insert_novel("src", &NovelSnapshot { path: "/n".to_string(), name: "N".to_string(), ..Default::default() })
            .await
            .unwrap();
        let changes: ChangeSet =
            [Change::Insert { chapter: ChapterSnapshot::new("/c1", "Ch1"), position: 0 }].into_iter().collect();
        let inserted = repo.apply_changes(novel.id, &changes).await.unwrap().inserted.remove(0);

        let gateway = Gateway::new(Registry::new().with(MockSource::new("src").with_chapter("/c1", "<p>One</p>")));
        let storage = Arc::new(MockBackend::default());
        let downloader = StorageDownloader::new(gateway, repo.clone(), storage.clone());
        downloader.download("src", novel.id, &inserted).await.unwrap();

        let file = chapter_file("src", novel.id, inserted.id).unwrap();
        assert_eq!(storage.read(&file).await.unwrap(), b"<p>One</p>");
        assert!(repo.get_chapter(inserted.id).await.unwrap().unwrap().is_downloaded);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_chapter_unmarked() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let novel = repo
            .insert_novel("src", &NovelSnapshot { path: "/n".to_string(), name: "N".to_string(), ..Default::default() })
            .await
            .unwrap();
        let changes: ChangeSet =
            [Change::Insert { chapter: ChapterSnapshot::new("/gone", "Gone"), position: 0 }].into_iter().collect();
        let inserted = repo.apply_changes(novel.id, &changes).await.unwrap().inserted.remove(0);

        let gateway = Gateway::new(Registry::new().with(MockSource::new("src")));
        let storage = Arc::new(MockBackend::default());
        let downloader = StorageDownloader::new(gateway, repo.clone(), storage.clone());
        let err = downloader.download("src", novel.id, &inserted).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch));
        assert!(storage.paths().await.is_empty());
        assert!(!repo.get_chapter(inserted.id).await.unwrap().unwrap().is_downloaded);
    }
}
