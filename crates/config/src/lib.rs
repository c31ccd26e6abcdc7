//! Layered configuration for tome.
//!
//! Values are resolved in order of increasing priority:
//!
//! 1. Built-in defaults (platform data directory via [`directories`]),
//! 2. an optional configuration file (TOML, YAML or JSON by extension),
//! 3. environment variables prefixed with `TOME_`, using `__` to reach
//!    nested keys (e.g. `TOME_SYNC__CONCURRENCY=8`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "TOME_";
const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database holding novels, chapters and the key-value cache.
    pub database: PathBuf,
    /// Root directory for cached covers and downloaded chapters.
    pub storage: PathBuf,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Defaults applied to every sync cycle unless the caller overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Download chapters that were newly discovered during a sync.
    pub download_new_chapters: bool,
    /// Re-fetch cover and metadata instead of only the chapter list.
    pub refresh_metadata: bool,
    /// How many novels a library-wide sync processes at once.
    pub concurrency: usize,
}
impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_new_chapters: false,
            refresh_metadata: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Defaults rooted in the platform data directory.
    pub fn defaults() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "tome").ok_or_raise(|| ErrorKind::NoProjectDirs)?;
        Ok(Self::rooted_at(dirs.data_dir()))
    }

    /// Defaults with every path placed under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            database: root.join("tome.db"),
            storage: root.join("downloads"),
            sync: SyncConfig::default(),
        }
    }

    /// Load configuration from defaults, an optional file, and the environment.
    ///
    /// An explicitly passed file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(file) = file
            && !file.is_file()
        {
            exn::bail!(ErrorKind::FileNotFound(file.to_path_buf()));
        }
        let mut figment = Figment::from(Serialized::defaults(Self::defaults()?));
        if let Some(file) = file {
            figment = Self::merge_file(figment, file);
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate a configuration from an already layered [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        tracing::debug!(
            database = %config.database.display(),
            storage = %config.storage.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn merge_file(figment: Figment, file: &Path) -> Figment {
        match file.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
            Some("json") => figment.merge(Json::file(file)),
            _ => figment.merge(Toml::file(file)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sync.concurrency == 0 {
            exn::bail!(ErrorKind::Validation("sync.concurrency"));
        }
        if !self.storage.is_absolute() {
            exn::bail!(ErrorKind::Validation("storage"));
        }
        Ok(())
    }
}
