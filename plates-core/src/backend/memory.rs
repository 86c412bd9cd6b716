//! In-memory file backend for tests and offline use

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use base64::Engine;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{EntryKind, FileBackend, FileDescriptor, PutFileRequest, RemoteFile};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::record::VersionHandle;

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    sha: String,
}

/// A versioned file store held in memory.
///
/// Files are scoped per branch. Every write issues a fresh version token, and
/// writes follow the same rules as the GitHub contents API: a handle must
/// match the stored version, and a write without one must not overwrite.
#[derive(Default)]
pub struct MemoryBackend {
    /// Storage: (branch, path) -> file
    files: DashMap<(String, String), StoredFile>,
    /// Paths whose fetches fail with a store error
    failing: RwLock<HashSet<String>>,
    /// Identity reported by `current_user`
    user: RwLock<Option<String>>,
}

impl MemoryBackend {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Report this login from `current_user`
    pub fn with_user(self, login: impl Into<String>) -> Self {
        *self.user.write() = Some(login.into());
        self
    }

    /// Seed a file with plain text content, returning its version
    pub fn insert_text(&self, branch: &str, path: &str, text: &str) -> VersionHandle {
        let sha = new_sha();
        self.files.insert(
            (branch.to_string(), path.to_string()),
            StoredFile {
                content: encode_wrapped(text),
                sha: sha.clone(),
            },
        );
        VersionHandle::new(sha)
    }

    /// Make fetches of `path` fail with a server error
    pub fn fail_fetches_of(&self, path: impl Into<String>) {
        self.failing.write().insert(path.into());
    }

    /// Decoded text of a stored file
    pub fn text(&self, branch: &str, path: &str) -> Option<String> {
        let file = self.files.get(&(branch.to_string(), path.to_string()))?;
        let compact: String = file.content.split_whitespace().collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Number of files across all branches
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the store holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn new_sha() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Encode like the GitHub API does: base64 wrapped at 60 columns
fn encode_wrapped(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl FileBackend for MemoryBackend {
    async fn list_dir(&self, config: &StoreConfig, dir: &str) -> Result<Vec<FileDescriptor>> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let mut files = BTreeMap::new();
        let mut dirs = BTreeSet::new();

        for entry in self.files.iter() {
            let (branch, path) = entry.key();
            if branch != &config.branch {
                continue;
            }
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((sub, _)) => {
                    dirs.insert(format!("{}{}", prefix, sub));
                }
                None => {
                    files.insert(path.clone(), FileDescriptor::file(path.clone()));
                }
            }
        }

        let mut listing: Vec<FileDescriptor> = dirs
            .into_iter()
            .map(|path| FileDescriptor {
                path,
                url: None,
                kind: EntryKind::Dir,
            })
            .collect();
        listing.extend(files.into_values());
        listing.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(listing)
    }

    async fn get_file(&self, config: &StoreConfig, path: &str) -> Result<Option<RemoteFile>> {
        if self.failing.read().contains(path) {
            return Err(Error::store(500, format!("simulated failure for {}", path)));
        }
        let key = (config.branch.clone(), path.to_string());
        Ok(self.files.get(&key).map(|file| RemoteFile {
            path: path.to_string(),
            content: file.content.clone(),
            handle: VersionHandle::new(file.sha.clone()),
        }))
    }

    async fn put_file(
        &self,
        config: &StoreConfig,
        path: &str,
        request: PutFileRequest,
    ) -> Result<()> {
        let key = (config.branch.clone(), path.to_string());
        let slot = self.files.entry(key);

        match (&slot, &request.handle) {
            (Entry::Occupied(existing), Some(handle)) => {
                if existing.get().sha != handle.as_str() {
                    return Err(Error::conflict(
                        path,
                        format!("{} does not match {}", path, handle.as_str()),
                    ));
                }
            }
            (Entry::Occupied(_), None) => {
                return Err(Error::store(422, "\"sha\" wasn't supplied."));
            }
            (Entry::Vacant(_), Some(_)) => {
                return Err(Error::conflict(path, format!("{} no longer exists", path)));
            }
            (Entry::Vacant(_), None) => {}
        }

        let file = StoredFile {
            content: request.content,
            sha: new_sha(),
        };
        slot.insert(file);
        Ok(())
    }

    async fn current_user(&self, _config: &StoreConfig) -> Result<Option<String>> {
        Ok(self.user.read().clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
