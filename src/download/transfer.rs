//! Transfer sinks: where downloaded and synthesized content ends up.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::output::create_download_bar;

/// Minimum file size to show a progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Transfers allowed to hold a connection or file handle at once.
pub const DEFAULT_CONCURRENT_TRANSFERS: usize = 8;

/// Suffix of a download that has not finished yet.
const PARTIAL_SUFFIX: &str = ".part";

/// `notes.pdf` becomes `notes.pdf.part` next to it.
fn partial_path(output_path: &Path) -> PathBuf {
    let mut name = output_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(PARTIAL_SUFFIX);
    output_path.with_file_name(name)
}

/// Content to transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSource {
    /// Remote content fetched from a direct URL.
    Url(String),
    /// Bytes produced locally.
    Inline {
        content: Vec<u8>,
        mime: &'static str,
    },
}

/// Destination for transfers.
///
/// `dest` is relative to the sink's root, e.g. `CS1010/Files/notes.pdf`.
#[async_trait]
pub trait TransferSink: Send + Sync {
    async fn transfer(&self, source: TransferSource, dest: &Path) -> Result<()>;
}

/// Writes transfers below a directory on the local filesystem.
///
/// Callers may issue any number of transfers; a shared semaphore caps how
/// many run at once.
#[derive(Debug, Clone)]
pub struct FsTransferSink {
    root: PathBuf,
    client: Client,
    show_progress: bool,
    permits: Arc<Semaphore>,
}

impl FsTransferSink {
    pub fn new(root: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            root: root.into(),
            client,
            show_progress: false,
            permits: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_TRANSFERS)),
        }
    }

    /// Limit simultaneous transfers. Zero is treated as one.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Show byte progress for large files.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stream `url` into a `.part` file and move it into place once complete.
    async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        let partial = partial_path(output_path);
        match self.stream_to(url, output_path, &partial).await {
            Ok(()) => {
                tokio::fs::rename(&partial, output_path).await?;
                Ok(())
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove {}: {}",
                            partial.display(),
                            remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, output_path: &Path, partial: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_length = response.content_length();
        let progress = if self.show_progress
            && content_length.map(|l| l > PROGRESS_THRESHOLD).unwrap_or(false)
        {
            let label = output_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(create_download_bar(content_length.unwrap_or(0), &label))
        } else {
            None
        };

        let mut file = File::create(partial).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Transfer(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(expected) = content_length {
            if downloaded != expected {
                return Err(Error::Transfer(format!(
                    "Incomplete download of {}: {} of {} bytes",
                    url, downloaded, expected
                )));
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(())
    }
}

#[async_trait]
impl TransferSink for FsTransferSink {
    async fn transfer(&self, source: TransferSource, dest: &Path) -> Result<()> {
        let output_path = self.root.join(dest);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| Error::Transfer(format!("Transfer queue closed: {}", e)))?;

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match source {
            TransferSource::Url(url) => self.download(&url, &output_path).await?,
            TransferSource::Inline { content, mime } => {
                tracing::trace!("Writing {} bytes of {}", content.len(), mime);
                tokio::fs::write(&output_path, content).await?;
            }
        }

        if self.show_progress {
            tracing::info!("Downloaded: {}", output_path.display());
        }

        Ok(())
    }
}
