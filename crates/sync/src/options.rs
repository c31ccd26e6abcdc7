use tome_config::SyncConfig;

/// Per-cycle switches for [`Synchronizer::sync_novel`](crate::Synchronizer::sync_novel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Download chapters that were inserted during the cycle.
    pub download_new_chapters: bool,
    /// Re-cache the cover and rewrite every metadata field.
    pub refresh_metadata: bool,
    /// Novels processed at once by [`sync_library`](crate::sync_library).
    pub concurrency: usize,
}
impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}
impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            download_new_chapters: config.download_new_chapters,
            refresh_metadata: config.refresh_metadata,
            concurrency: config.concurrency.max(1),
        }
    }
}
impl SyncOptions {
    pub fn with_downloads(mut self, download_new_chapters: bool) -> Self {
        self.download_new_chapters = download_new_chapters;
        self
    }

    pub fn with_metadata_refresh(mut self, refresh_metadata: bool) -> Self {
        self.refresh_metadata = refresh_metadata;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}
