mod cycle;
mod extract;
mod library;
mod metadata;
mod types;

pub use cycle::CycleState;
pub use extract::extract_media_id;
pub use library::{DirectoryLibrary, MediaSaver};
pub use metadata::{InstagramMetadataSource, MetadataSource};
pub use types::{CycleReport, LinkOutcome, MediaKind};

use crate::{error::DownloadError, links::Link, permission::PermissionProvider};
use cycle::CycleTracker;
use futures::{stream, Stream, StreamExt};
use tracing::{error, info, warn};

/// Works through a list of links one at a time: resolve the post code,
/// look up its metadata, then hand the chosen media URL to the library.
pub struct MediaDownloader {
    metadata: Box<dyn MetadataSource>,
    library: Box<dyn MediaSaver>,
    permission: Box<dyn PermissionProvider>,
    cycle: CycleTracker,
}

impl MediaDownloader {
    pub fn new(
        metadata: Box<dyn MetadataSource>,
        library: Box<dyn MediaSaver>,
        permission: Box<dyn PermissionProvider>,
    ) -> Self {
        Self {
            metadata,
            library,
            permission,
            cycle: CycleTracker::default(),
        }
    }

    pub fn state(&self) -> CycleState {
        self.cycle.current()
    }

    /// Runs one download cycle over `links`.
    ///
    /// Links whose post code cannot be extracted, or whose metadata has no
    /// media descriptor, are reported and passed over. Any other failure ends
    /// the cycle and the remaining links are left alone.
    pub async fn download_all(&self, links: &[Link]) -> Result<CycleReport, DownloadError> {
        if links.is_empty() {
            return Err(DownloadError::NoLinks);
        }

        // Held across the permission request; a denial restores the previous
        // state.
        let guard = self.cycle.begin()?;

        match self.permission.request().await {
            Ok(true) => {}
            Ok(false) => {
                guard.cancel();
                return Err(DownloadError::PermissionDenied);
            }
            Err(e) => {
                warn!("Permission request failed: {:#}", e);
                guard.cancel();
                return Err(DownloadError::PermissionDenied);
            }
        }

        info!("Starting download cycle for {} links", links.len());

        let mut report = CycleReport::default();
        let mut outcomes = std::pin::pin!(self.outcomes(links));
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Download cycle aborted: {:?}", e);
                    guard.finish(false);
                    return Err(e);
                }
            }
        }

        info!(
            "Download cycle finished: {} saved, {} skipped, {} without media",
            report.saved(),
            report.skipped().count(),
            report.without_media().count()
        );
        guard.finish(true);
        Ok(report)
    }

    /// Lazily processes `links` in order, one per poll. The stream ends right
    /// after the first error, so later links are never touched.
    pub fn outcomes<'a>(
        &'a self,
        links: &'a [Link],
    ) -> impl Stream<Item = Result<LinkOutcome, DownloadError>> + 'a {
        stream::unfold((0usize, false), move |(index, halted)| async move {
            if halted {
                return None;
            }
            let link = links.get(index)?;
            let result = self.process(index, link).await;
            let halted = result.is_err();
            Some((result, (index + 1, halted)))
        })
    }

    async fn process(&self, index: usize, link: &Link) -> Result<LinkOutcome, DownloadError> {
        let Some(id) = extract_media_id(link.as_str()) else {
            warn!("Could not extract media ID from link #{}: {}", index + 1, link);
            return Ok(LinkOutcome::Skipped { link: link.clone() });
        };

        info!("[{}] Resolving media {}", index + 1, id);

        let document = self
            .metadata
            .fetch(&id)
            .await
            .map_err(|source| DownloadError::Fetch {
                id: id.to_string(),
                source,
            })?;

        let Some(descriptor) = document.descriptor() else {
            warn!("Could not fetch media for link #{}: {}", index + 1, link);
            return Ok(LinkOutcome::NoMedia { link: link.clone() });
        };

        let reference = descriptor
            .media_reference()
            .ok_or_else(|| DownloadError::MalformedResponse { id: id.to_string() })?;

        let saved = self
            .library
            .save(&id, &reference)
            .await
            .map_err(|source| DownloadError::Save {
                url: reference.url.clone(),
                source,
            })?;

        Ok(LinkOutcome::Saved {
            link: link.clone(),
            id,
            reference,
            saved,
        })
    }
}
