use crate::links::Link;
use serde::Deserialize;
use std::{fmt, path::PathBuf};

/// Short code identifying a post, taken from the `/p/<code>/` path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaIdentifier(pub(crate) String);

impl MediaIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// The raw media URL chosen for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub url: String,
    pub kind: MediaKind,
}

/// Post metadata document as returned by the `?__a=1` endpoint. Only the
/// fields needed to pick a media URL are kept.
#[derive(Debug, Default, Deserialize)]
pub struct MediaDocument {
    #[serde(default)]
    pub graphql: Option<Graphql>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Graphql {
    #[serde(default)]
    pub shortcode_media: Option<MediaDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaDescriptor {
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
}

impl MediaDocument {
    pub fn descriptor(&self) -> Option<&MediaDescriptor> {
        self.graphql.as_ref()?.shortcode_media.as_ref()
    }

    /// `None` when the descriptor or the selected URL is missing.
    pub fn media_reference(&self) -> Option<MediaReference> {
        self.descriptor()?.media_reference()
    }
}

impl MediaDescriptor {
    /// Picks the video URL for video posts and the display URL otherwise.
    pub fn media_reference(&self) -> Option<MediaReference> {
        let (url, kind) = if self.is_video {
            (self.video_url.as_ref()?, MediaKind::Video)
        } else {
            (self.display_url.as_ref()?, MediaKind::Image)
        };
        Some(MediaReference {
            url: url.clone(),
            kind,
        })
    }
}

/// Where a saved media file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMedia {
    pub path: PathBuf,
    pub bytes: u64,
}

/// What happened to a single link during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Saved {
        link: Link,
        id: MediaIdentifier,
        reference: MediaReference,
        saved: SavedMedia,
    },
    /// No media identifier could be extracted; the cycle carried on.
    Skipped { link: Link },
    /// The metadata response had no media descriptor; the cycle carried on.
    NoMedia { link: Link },
}

/// Per-link outcomes of a cycle that ran to completion, in registry order.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<LinkOutcome>,
}

impl CycleReport {
    pub fn saved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LinkOutcome::Saved { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Link> {
        self.outcomes.iter().filter_map(|o| match o {
            LinkOutcome::Skipped { link } => Some(link),
            _ => None,
        })
    }

    pub fn without_media(&self) -> impl Iterator<Item = &Link> {
        self.outcomes.iter().filter_map(|o| match o {
            LinkOutcome::NoMedia { link } => Some(link),
            _ => None,
        })
    }
}
