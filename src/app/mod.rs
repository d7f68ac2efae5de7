mod alert;

pub use alert::Alert;

use crate::{
    config::Config,
    error::{DownloadError, ValidationError},
    links::{Link, LinkRegistry},
    media::{
        CycleReport, CycleState, DirectoryLibrary, InstagramMetadataSource, MediaDownloader,
    },
    permission::LibraryPermission,
};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Everything the front end needs: the link list and the downloader that
/// works through it.
///
/// A cycle always runs over a snapshot taken when it starts. While
/// [`Session::download_all`] is in flight the session is borrowed, so `add`
/// and `remove` cannot interleave with it.
pub struct Session {
    links: LinkRegistry,
    downloader: MediaDownloader,
}

impl Session {
    pub fn new(downloader: MediaDownloader) -> Self {
        Self {
            links: LinkRegistry::new(),
            downloader,
        }
    }

    /// Wires up the HTTP metadata source, a directory-backed library, and
    /// the matching permission check.
    pub fn from_config(config: &Config, library_override: Option<PathBuf>) -> Result<Self> {
        let directory = library_override.unwrap_or_else(|| config.library.resolve_directory());
        info!("Media library: {}", directory.display());

        let downloader = MediaDownloader::new(
            Box::new(InstagramMetadataSource::new(&config.instagram)?),
            Box::new(DirectoryLibrary::new(&directory, &config.instagram)?),
            Box::new(LibraryPermission::new(&directory)),
        );
        Ok(Self::new(downloader))
    }

    pub fn add(&mut self, raw: &str) -> Result<&Link, ValidationError> {
        match self.links.add(raw) {
            Ok(link) => Ok(link),
            Err(e) => {
                warn!("Rejected link: {}", e);
                Err(e)
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<Link, ValidationError> {
        self.links.remove(index)
    }

    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkRegistry {
        &mut self.links
    }

    pub fn state(&self) -> CycleState {
        self.downloader.state()
    }

    pub async fn download_all(&self) -> Result<CycleReport, DownloadError> {
        let snapshot = self.links.snapshot();
        let result = self.downloader.download_all(&snapshot).await;
        if let Err(e) = &result {
            if e.is_precondition() {
                warn!("Download cycle not started: {}", e);
            } else {
                error!("Download cycle failed: {}", e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::{image_doc, FakeLibrary, FakeMetadata};
    use crate::permission::FixedPermission;

    fn session(metadata: FakeMetadata, granted: bool) -> Session {
        Session::new(MediaDownloader::new(
            Box::new(metadata),
            Box::new(FakeLibrary::default()),
            Box::new(FixedPermission(granted)),
        ))
    }

    #[tokio::test]
    async fn test_session_downloads_registered_links() {
        let metadata = FakeMetadata::default().with("ABC123", &image_doc("https://cdn/abc.jpg"));
        let mut session = session(metadata, true);

        session.add("https://instagram.com/p/ABC123/").unwrap();
        session.add("https://instagram.com/explore/").unwrap();

        let report = session.download_all().await.unwrap();
        let alerts = Alert::for_report(&report);
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].message, "image ABC123 -> ABC123.jpg (1 B)");
        assert_eq!(
            alerts[1].message,
            "Could not extract media ID from: https://instagram.com/explore/"
        );
        assert_eq!(alerts[2].title, "Success");
        assert_eq!(session.state(), CycleState::Succeeded);
        // registry is untouched by a cycle
        assert_eq!(session.links().len(), 2);
    }

    #[tokio::test]
    async fn test_session_empty_registry() {
        let session = session(FakeMetadata::default(), true);
        let err = session.download_all().await.unwrap_err();
        assert_eq!(Alert::from(&err).title, "No Links");
    }

    #[tokio::test]
    async fn test_session_permission_denied() {
        let metadata = FakeMetadata::default().with("A", &image_doc("https://cdn/a.jpg"));
        let calls = metadata.calls.clone();
        let mut session = session(metadata, false);
        session.add("https://instagram.com/p/A/").unwrap();

        let err = session.download_all().await.unwrap_err();
        assert!(matches!(err, DownloadError::PermissionDenied));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(session.state(), CycleState::Idle);
    }

    #[test]
    fn test_session_add_remove() {
        let mut session = session(FakeMetadata::default(), true);
        session.add("https://instagram.com/p/A/").unwrap();
        session.add("https://instagram.com/p/B/").unwrap();
        assert!(session.add("https://example.com").is_err());

        let removed = session.remove(0).unwrap();
        assert_eq!(removed.as_str(), "https://instagram.com/p/A/");
        assert_eq!(session.links().len(), 1);
    }
}
