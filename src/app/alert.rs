use crate::{
    error::{DownloadError, ValidationError},
    links::Link,
    media::{CycleReport, LinkOutcome, MediaKind},
    utils,
};
use std::fmt;

/// A notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    fn new(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            title,
            message: message.into(),
        }
    }

    pub fn added(link: &Link) -> Self {
        Self::new("Link Added", link.to_string())
    }

    pub fn removed(link: &Link) -> Self {
        Self::new("Link Removed", link.to_string())
    }

    pub fn skipped(link: &Link) -> Self {
        Self::new(
            "Invalid Link",
            format!("Could not extract media ID from: {}", link),
        )
    }

    pub fn no_media(link: &Link) -> Self {
        Self::new("Error", format!("Could not fetch media for: {}", link))
    }

    /// One alert per link in registry order, followed by the overall
    /// success notice.
    pub fn for_report(report: &CycleReport) -> Vec<Self> {
        let mut alerts: Vec<Self> = report
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                LinkOutcome::Saved {
                    id,
                    reference,
                    saved,
                    ..
                } => Self::new(
                    "Saved",
                    format!(
                        "{} {} -> {} ({})",
                        match reference.kind {
                            MediaKind::Image => "image",
                            MediaKind::Video => "video",
                        },
                        id,
                        saved.path.display(),
                        utils::format_size(saved.bytes)
                    ),
                ),
                LinkOutcome::Skipped { link } => Self::skipped(link),
                LinkOutcome::NoMedia { link } => Self::no_media(link),
            })
            .collect();
        alerts.push(Self::new(
            "Success",
            format!(
                "All media has been downloaded to your library! ({} saved)",
                report.saved()
            ),
        ));
        alerts
    }
}

impl From<&ValidationError> for Alert {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::Empty => Self::new("Invalid Link", "Please enter a link."),
            ValidationError::CapacityExceeded { limit } => Self::new(
                "Maximum Links Reached",
                format!("You can only add up to {} links.", limit),
            ),
            ValidationError::InvalidFormat(_) => {
                Self::new("Invalid Link", "Please enter a valid Instagram link.")
            }
            ValidationError::IndexOutOfBounds { index, len } => Self::new(
                "Invalid Selection",
                format!("There is no link #{} (the list has {}).", index + 1, len),
            ),
        }
    }
}

impl From<&DownloadError> for Alert {
    fn from(err: &DownloadError) -> Self {
        match err {
            DownloadError::NoLinks => {
                Self::new("No Links", "Please add some Instagram links first.")
            }
            DownloadError::PermissionDenied => Self::new(
                "Permission Required",
                "Library write permission is required to save media.",
            ),
            DownloadError::AlreadyRunning => {
                Self::new("Busy", "A download is already in progress.")
            }
            DownloadError::Fetch { .. }
            | DownloadError::MalformedResponse { .. }
            | DownloadError::Save { .. } => {
                Self::new("Error", "Failed to download media. Please try again.")
            }
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
