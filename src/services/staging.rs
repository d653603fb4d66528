//! Local staging for in-flight uploads.
//!
//! Every upload gets its own randomly named file inside the staging directory,
//! so concurrent requests never share a path. The file is owned by a
//! [`StagedUpload`] and removed when that value is dropped, whichever way the
//! request ends.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncWriteExt};

const STAGING_PREFIX: &str = "upload-";

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the staging directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create staging dir {}", self.dir.display()))
    }

    /// Copy `reader` to a fresh staging file.
    pub async fn stage<R>(&self, mut reader: R) -> Result<StagedUpload>
    where
        R: AsyncRead + Unpin + Send,
    {
        let dir = self.dir.clone();
        let (file, handle) = tokio::task::spawn_blocking(move || {
            let file = tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempfile_in(&dir)?;
            let handle = file.reopen()?;
            Ok::<_, std::io::Error>((file, handle))
        })
        .await?
        .with_context(|| format!("Failed to create staging file in {}", self.dir.display()))?;

        // Ownership of `file` moves into the guard first so an error below still
        // removes the partial file.
        let mut staged = StagedUpload { file, size: 0 };

        let mut writer = tokio::fs::File::from_std(handle);
        let size = tokio::io::copy(&mut reader, &mut writer)
            .await
            .context("Failed to write staging file")?;
        writer.flush().await?;
        writer.sync_all().await?;

        staged.size = size;
        tracing::debug!("Staged {} bytes at {}", size, staged.path().display());
        Ok(staged)
    }
}

/// A staged upload. Dropping it deletes the file.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Delete the staging file, surfacing any removal error.
    pub fn close(self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .with_context(|| format!("Failed to remove staging file {}", path.display()))
    }
}
