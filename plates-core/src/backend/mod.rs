//! Capability interface over the remote versioned file store
//!
//! Implement [`FileBackend`] to plug in a new store. Backends speak the
//! transport format (base64 content, opaque version tokens); encoding and
//! decoding records is the record store's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::Result;
use crate::record::VersionHandle;

pub mod memory;

pub use memory::MemoryBackend;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Sub-directory
    Dir,
    /// Symbolic link
    Symlink,
    /// Submodule
    Submodule,
    /// Anything else the store reports
    #[serde(other)]
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Repository-relative path
    pub path: String,
    /// Store URL addressing this entry directly, if the store provides one
    #[serde(default)]
    pub url: Option<String>,
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileDescriptor {
    /// Descriptor for a regular file without a direct URL
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: None,
            kind: EntryKind::File,
        }
    }

    /// Whether the entry holds content worth fetching
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A fetched file in transport encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Repository-relative path
    pub path: String,
    /// Base64 content, possibly wrapped with newlines
    pub content: String,
    /// Version of the file as fetched
    pub handle: VersionHandle,
}

/// Conditional create-or-replace request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFileRequest {
    /// Commit message
    pub message: String,
    /// Base64 content
    pub content: String,
    /// Present: replace only if unchanged since this version.
    /// Absent: the file must not exist yet.
    pub handle: Option<VersionHandle>,
}

/// Trait for remote file stores
#[async_trait]
pub trait FileBackend: Send + Sync {
    /// List a directory on the configured branch.
    ///
    /// A directory that does not exist yields an empty list.
    async fn list_dir(&self, config: &StoreConfig, dir: &str) -> Result<Vec<FileDescriptor>>;

    /// Fetch a file by path. `Ok(None)` when it does not exist.
    async fn get_file(&self, config: &StoreConfig, path: &str) -> Result<Option<RemoteFile>>;

    /// Fetch the file behind a listing entry.
    ///
    /// Defaults to fetching by path; backends with direct URLs may override.
    async fn fetch_entry(
        &self,
        config: &StoreConfig,
        entry: &FileDescriptor,
    ) -> Result<Option<RemoteFile>> {
        self.get_file(config, &entry.path).await
    }

    /// Create or replace a file.
    ///
    /// Must fail with [`Error::Conflict`](crate::error::Error::Conflict) when
    /// the handle no longer matches the stored version.
    async fn put_file(&self, config: &StoreConfig, path: &str, request: PutFileRequest)
        -> Result<()>;

    /// Identity behind the configured credential, if the store can tell
    async fn current_user(&self, _config: &StoreConfig) -> Result<Option<String>> {
        Ok(None)
    }

    /// Get backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}
