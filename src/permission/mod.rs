use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Grants or denies write access to the media library.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request(&self) -> Result<bool>;
}

/// Grants access when the library directory exists (or can be created) and
/// accepts a scratch file.
pub struct LibraryPermission {
    directory: PathBuf,
}

impl LibraryPermission {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn check_writable(directory: PathBuf) -> Result<()> {
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create {}", directory.display()))?;
        tempfile::NamedTempFile::new_in(&directory)
            .with_context(|| format!("{} is not writable", directory.display()))?;
        Ok(())
    }
}

#[async_trait]
impl PermissionProvider for LibraryPermission {
    async fn request(&self) -> Result<bool> {
        let directory = self.directory.clone();
        let writable = tokio::task::spawn_blocking(move || Self::check_writable(directory))
            .await
            .context("Permission check task failed")?;

        match writable {
            Ok(()) => {
                debug!("Write access granted for {}", self.directory.display());
                Ok(true)
            }
            Err(e) => {
                warn!("Write access denied: {:#}", e);
                Ok(false)
            }
        }
    }
}

/// Always answers the same way.
#[cfg(test)]
pub struct FixedPermission(pub bool);

#[cfg(test)]
#[async_trait]
impl PermissionProvider for FixedPermission {
    async fn request(&self) -> Result<bool> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grants_for_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("library");
        let permission = LibraryPermission::new(&target);

        assert!(permission.request().await.unwrap());
        assert!(target.is_dir());
        // scratch file is cleaned up
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_denies_when_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let permission = LibraryPermission::new(&file);
        assert!(!permission.request().await.unwrap());
    }

    #[tokio::test]
    async fn test_fixed_permission() {
        assert!(FixedPermission(true).request().await.unwrap());
        assert!(!FixedPermission(false).request().await.unwrap());
    }
}
