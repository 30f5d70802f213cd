//! Disk layout for uploaded files and helpers for storing multipart parts.
//!
//! Avatar and image paths start at `/images/…` (served statically), file and
//! document paths at `files/…` (streamed through download routes, never
//! served directly).

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

/// Where uploads live on disk. The `public/` subtree is served statically;
/// `files/` is reachable only through the download routes.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub root: PathBuf,
}

impl UploadConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.public_dir().join("images")
    }

    pub fn avatars_dir(&self) -> PathBuf {
        self.images_dir().join("avatars")
    }

    pub fn private_files_dir(&self) -> PathBuf {
        self.root.join("files").join("private")
    }

    pub fn public_files_dir(&self) -> PathBuf {
        self.root.join("files").join("public")
    }

    /// Map a stored path back to its absolute location on disk.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let trimmed = stored.trim_start_matches('/');
        if trimmed.starts_with("images/") || trimmed.starts_with("img/") {
            self.public_dir().join(trimmed)
        } else {
            self.root.join(trimmed)
        }
    }
}

/// A stored filename that cannot collide: the original name plus a random
/// suffix.
pub fn unique_name(original: &str) -> String {
    // Path separators in a client-supplied filename must not escape the
    // upload directory.
    let safe = original.replace(['/', '\\'], "_");
    format!("{}_{}", safe, Uuid::new_v4().simple())
}

/// Write one uploaded part to `dir/filename`, creating the directory if
/// needed.
pub async fn store(dir: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

/// Best-effort unlink: delete errors are logged and swallowed, since the
/// record is already gone and the request has succeeded.
pub async fn unlink_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to unlink {}: {}", path.display(), e);
    }
}
