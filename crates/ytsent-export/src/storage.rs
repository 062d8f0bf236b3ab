//! Saves export bytes and analysis reports into a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use ytsent_core::AppConfig;

use crate::error::StorageError;
use crate::serialize::ExportFormat;

const EXPORT_PREFIX: &str = "comments";
const REPORT_PREFIX: &str = "analysis_report";
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Names of previously saved files, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SavedFiles {
    pub csv: Vec<String>,
    pub json: Vec<String>,
}

/// File-writing collaborator rooted at one directory.
///
/// Files are named `<prefix>_<YYYYmmdd_HHMMSS>.<ext>`. A second save within
/// the same second gets a `_<n>` suffix instead of overwriting.
#[derive(Debug, Clone)]
pub struct ExportStore {
    dir: PathBuf,
}

impl ExportStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes serialized comments as `comments_<ts>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory cannot be created or the
    /// file cannot be written.
    pub async fn save(&self, bytes: &[u8], format: ExportFormat) -> Result<PathBuf, StorageError> {
        self.write_new(EXPORT_PREFIX, format.extension(), bytes, Utc::now())
            .await
    }

    /// Writes a JSON analysis report as `analysis_report_<ts>.json`.
    ///
    /// # Errors
    ///
    /// See [`ExportStore::save`].
    pub async fn save_report(&self, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        self.write_new(REPORT_PREFIX, ExportFormat::Json.extension(), bytes, Utc::now())
            .await
    }

    /// Lists saved `.csv` and `.json` files. A missing directory is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory exists but cannot be read.
    pub async fn list_saved(&self) -> Result<SavedFiles, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SavedFiles::default()),
            Err(e) => return Err(self.io_error(&self.dir, e)),
        };

        let mut saved = SavedFiles::default();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| self.io_error(&self.dir, e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let path = Path::new(&name);
            match path.extension().and_then(|e| e.to_str()) {
                Some("csv") => saved.csv.push(name),
                Some("json") => saved.json.push(name),
                _ => {}
            }
        }
        saved.csv.sort();
        saved.json.sort();
        Ok(saved)
    }

    async fn write_new(
        &self,
        prefix: &str,
        extension: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.io_error(&self.dir, e))?;

        let stem = format!("{prefix}_{}", now.format("%Y%m%d_%H%M%S"));
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stem}.{extension}")
            } else {
                format!("{stem}_{attempt}.{extension}")
            };
            let path = self.dir.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(self.io_error(&path, e)),
            };
            file.write_all(bytes)
                .await
                .map_err(|e| self.io_error(&path, e))?;
            file.flush().await.map_err(|e| self.io_error(&path, e))?;

            tracing::info!(path = %path.display(), bytes = bytes.len(), "saved export file");
            return Ok(path);
        }
        Err(StorageError::NameExhausted(stem))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        tracing::warn!(dir = %self.dir.display(), path = %path.display(), error = %source, "storage I/O failed");
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
