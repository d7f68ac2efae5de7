use thiserror::Error;

/// Reasons a link is refused by the registry. The registry is left untouched
/// whenever one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("link is empty")]
    Empty,

    #[error("registry already holds the maximum of {limit} links")]
    CapacityExceeded { limit: usize },

    #[error("not an Instagram link: {0}")]
    InvalidFormat(String),

    #[error("no link at position {index} (registry holds {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Failures that stop a download cycle, or keep one from starting.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no links to download")]
    NoLinks,

    #[error("permission to write to the media library was not granted")]
    PermissionDenied,

    #[error("a download cycle is already running")]
    AlreadyRunning,

    #[error("failed to fetch metadata for {id}")]
    Fetch {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("metadata for {id} has no media descriptor")]
    MalformedResponse { id: String },

    #[error("failed to save {url}")]
    Save {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DownloadError {
    /// Errors raised before any link was processed.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DownloadError::NoLinks | DownloadError::PermissionDenied | DownloadError::AlreadyRunning
        )
    }
}
