use crate::error::ValidationError;
use std::fmt;
use tracing::debug;

/// Most links a registry will hold at once.
pub const MAX_LINKS: usize = 20;

/// Substring every accepted link has to contain.
pub const SERVICE_MARKER: &str = "instagram.com";

/// A validated, trimmed post link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link(String);

impl Link {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of links waiting to be downloaded.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    links: Vec<Link>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `raw` and appends it, trimmed, to the end of the list.
    ///
    /// Checks run in a fixed order: blank input, then capacity, then the
    /// service marker.
    pub fn add(&mut self, raw: &str) -> Result<&Link, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        if self.is_full() {
            return Err(ValidationError::CapacityExceeded { limit: MAX_LINKS });
        }
        if !trimmed.contains(SERVICE_MARKER) {
            return Err(ValidationError::InvalidFormat(trimmed.to_string()));
        }

        debug!("Adding link #{}: {}", self.links.len() + 1, trimmed);
        self.links.push(Link(trimmed.to_string()));
        Ok(&self.links[self.links.len() - 1])
    }

    /// Removes the link at `index`, shifting later links down by one.
    pub fn remove(&mut self, index: usize) -> Result<Link, ValidationError> {
        if index >= self.links.len() {
            return Err(ValidationError::IndexOutOfBounds {
                index,
                len: self.links.len(),
            });
        }
        let link = self.links.remove(index);
        debug!("Removed link #{}: {}", index + 1, link);
        Ok(link)
    }

    /// Adds every non-blank line of `text`, returning one result per line
    /// that was attempted.
    pub fn extend_from_lines(&mut self, text: &str) -> Vec<(String, Result<(), ValidationError>)> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let result = self.add(line).map(|_| ());
                (line.trim().to_string(), result)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.links.len() >= MAX_LINKS
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Copy of the current list for a download cycle to work through.
    pub fn snapshot(&self) -> Vec<Link> {
        self.links.clone()
    }
}
