//! Artifact persistence
//!
//! Every JSON artifact is written pretty-printed to a temporary sibling file
//! and renamed into place, so readers never observe a partial document.

use crate::config::OutputConfig;
use crate::DistillError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const MAIN_PAGE_FILE: &str = "main-page.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const CONTENT_FILE: &str = "content.json";
pub const INDEX_FILE: &str = "index.json";

/// File name of the extraction record written next to a downloaded PDF
pub fn pdf_record_file(pdf_name: &str) -> String {
    format!("{}.json", pdf_name)
}

/// Creates the raw, processed and web content directories
pub async fn ensure_dirs(config: &OutputConfig) -> Result<(), DistillError> {
    for dir in [
        &config.raw_dir,
        &config.processed_dir,
        &config.web_content_dir,
    ] {
        tokio::fs::create_dir_all(dir).await?;
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes bytes to `path` through a temporary file and rename
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DistillError> {
    let tmp = temp_path(path);

    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Serializes `value` as 2-space indented JSON and writes it atomically
pub async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), DistillError> {
    let json = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &json).await
}

/// Copies a finished artifact to another location atomically
pub async fn copy_atomic(from: &Path, to: &Path) -> Result<(), DistillError> {
    let bytes = tokio::fs::read(from).await?;
    write_atomic(to, &bytes).await
}

/// Reads a JSON artifact, reporting a mismatched shape as [`DistillError::Shape`]
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DistillError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| DistillError::Shape {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Hands out `page-<millis>.json` names that never repeat within a run
#[derive(Debug, Default)]
pub struct PageFileNamer {
    last: i64,
}

impl PageFileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next file name, stamped with the current time or one past the last stamp
    pub fn next_name(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        format!("page-{}.json", self.last)
    }
}
