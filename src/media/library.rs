use super::types::{MediaIdentifier, MediaReference, SavedMedia};
use crate::{config::InstagramConfig, utils};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

#[async_trait]
pub trait MediaSaver: Send + Sync {
    /// Persist the media behind `reference` to the library.
    async fn save(&self, id: &MediaIdentifier, reference: &MediaReference) -> Result<SavedMedia>;
}

/// Media library backed by a local directory.
pub struct DirectoryLibrary {
    client: reqwest::Client,
    directory: PathBuf,
}

impl DirectoryLibrary {
    pub fn new(directory: impl Into<PathBuf>, config: &InstagramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.media_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            directory: directory.into(),
        })
    }

    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading media: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch media URL")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Failed to download media: HTTP {}",
                response.status()
            ));
        }

        Ok(response
            .bytes()
            .await
            .context("Failed to read media data")?
            .to_vec())
    }

    /// Opens a fresh file for the post, adding `_2`, `_3`, ... to the name
    /// when earlier saves already took it.
    async fn create_unique(&self, stem: &str, ext: &str) -> Result<(PathBuf, tokio::fs::File)> {
        let mut attempt = 1;
        loop {
            let filename = if attempt == 1 {
                format!("{}.{}", stem, ext)
            } else {
                format!("{}_{}.{}", stem, attempt, ext)
            };
            let path = self.directory.join(filename);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        }
    }
}

/// Writes `data` to the freshly created `file`, deleting `path` again if the
/// write does not complete.
async fn write_or_remove<W: AsyncWrite + Unpin>(
    path: &Path,
    mut file: W,
    data: &[u8],
) -> Result<()> {
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!("Failed to remove partial file {}: {}", path.display(), remove_err);
        }
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

#[async_trait]
impl MediaSaver for DirectoryLibrary {
    async fn save(&self, id: &MediaIdentifier, reference: &MediaReference) -> Result<SavedMedia> {
        let data = self.fetch_media(&reference.url).await?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create {}", self.directory.display()))?;

        let ext = utils::extension_from_url(&reference.url)
            .unwrap_or_else(|| reference.kind.default_extension().to_string());
        let stem = utils::sanitize_filename(id.as_str());
        let (path, file) = self.create_unique(&stem, &ext).await?;
        write_or_remove(&path, file, &data).await?;

        info!(
            "Saved {} ({}) to {}",
            id,
            utils::format_size(data.len() as u64),
            path.display()
        );

        Ok(SavedMedia {
            path,
            bytes: data.len() as u64,
        })
    }
}
