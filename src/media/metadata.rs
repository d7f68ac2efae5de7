use super::types::{MediaDocument, MediaIdentifier};
use crate::config::InstagramConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch the metadata document for a post.
    async fn fetch(&self, id: &MediaIdentifier) -> Result<MediaDocument>;
}

/// Reads post metadata from the public `/p/<code>/?__a=1` endpoint.
pub struct InstagramMetadataSource {
    client: reqwest::Client,
    base_url: Url,
}

impl InstagramMetadataSource {
    pub fn new(config: &InstagramConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    fn metadata_url(&self, id: &MediaIdentifier) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("p/{}/", id))
            .with_context(|| format!("Invalid metadata URL for {}", id))?;
        url.set_query(Some("__a=1"));
        Ok(url)
    }
}

#[async_trait]
impl MetadataSource for InstagramMetadataSource {
    async fn fetch(&self, id: &MediaIdentifier) -> Result<MediaDocument> {
        let url = self.metadata_url(id)?;
        debug!("Fetching metadata: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch post metadata")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Metadata request failed: HTTP {}",
                response.status()
            ));
        }

        // A 2xx body that is not a metadata document (the HTML login page,
        // for one) carries no media descriptor.
        match response.json::<MediaDocument>().await {
            Ok(document) => Ok(document),
            Err(e) if e.is_decode() => {
                warn!("Metadata for {} is not a JSON document: {}", id, e);
                Ok(MediaDocument::default())
            }
            Err(e) => Err(e).context("Failed to read metadata response"),
        }
    }
}
