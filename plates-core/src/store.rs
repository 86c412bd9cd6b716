//! Record store client
//!
//! Maps logical record operations (list, get, put) onto a [`FileBackend`].
//! Each plate lives in its own file, `{directory}/{plate}.{extension}`, holding
//! the record as pretty-printed JSON in base64 transport encoding. Writes are
//! conditional on the [`VersionHandle`] seen at read time.

use std::sync::Arc;

use base64::Engine;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::backend::{FileBackend, FileDescriptor, PutFileRequest, RemoteFile};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::plate;
use crate::record::{PlateRecord, VersionHandle};

/// Default number of file fetches in flight during a listing
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Where records live inside the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    /// Directory holding one file per record
    pub directory: String,
    /// File extension, without the dot
    pub extension: String,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            directory: "plates".to_string(),
            extension: "json".to_string(),
        }
    }
}

impl RecordLayout {
    /// Path of the file holding `plate_key`
    pub fn path_for(&self, plate_key: &str) -> String {
        format!(
            "{}/{}.{}",
            self.directory,
            urlencoding::encode(plate_key),
            self.extension
        )
    }

    /// Key derived from a storage path: directory prefix and extension stripped
    pub fn key_from_path<'a>(&self, path: &'a str) -> &'a str {
        let without_dir = path
            .strip_prefix(self.directory.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path);
        without_dir
            .strip_suffix(self.extension.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .unwrap_or(without_dir)
    }
}

/// Body of a listed file
#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    /// Content parsed as JSON
    Parsed(serde_json::Value),
    /// Content that is not JSON, kept as decoded text
    Raw(String),
}

/// One file returned by [`RecordStore::list`]
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEntry {
    /// Repository-relative path
    pub path: String,
    /// Decoded body
    pub body: EntryBody,
    /// Version of the file as fetched
    pub handle: VersionHandle,
}

impl ListedEntry {
    /// Parsed JSON body, if the content was JSON
    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            EntryBody::Parsed(value) => Some(value),
            EntryBody::Raw(_) => None,
        }
    }

    /// Non-empty `plate` string of a JSON body
    pub fn plate_field(&self) -> Option<&str> {
        self.json()?
            .get("plate")?
            .as_str()
            .filter(|plate| !plate.is_empty())
    }

    /// Body as a typed record, when it has the record's shape
    pub fn record(&self) -> Option<PlateRecord> {
        serde_json::from_value(self.json()?.clone()).ok()
    }
}

/// Client for plate records kept in a versioned file store
pub struct RecordStore<B: FileBackend> {
    backend: Arc<B>,
    layout: RecordLayout,
    fetch_concurrency: usize,
}

impl<B: FileBackend> Clone for RecordStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            layout: self.layout.clone(),
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}

impl<B: FileBackend> RecordStore<B> {
    /// Create a store over a backend with the default layout
    pub fn new(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create a store over a shared backend
    pub fn from_arc(backend: Arc<B>) -> Self {
        Self {
            backend,
            layout: RecordLayout::default(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Use a different record layout
    pub fn with_layout(mut self, layout: RecordLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Limit how many file fetches a listing runs at once (minimum 1)
    pub fn with_fetch_concurrency(mut self, limit: usize) -> Self {
        self.fetch_concurrency = limit.max(1);
        self
    }

    /// Record layout in use
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List every record file.
    ///
    /// A missing records directory yields an empty list. Files that fail to
    /// fetch or decode are dropped; the rest are returned in no particular order.
    pub async fn list(&self, config: &StoreConfig) -> Result<Vec<ListedEntry>> {
        config.validate()?;
        let entries = self
            .backend
            .list_dir(config, &self.layout.directory)
            .await?;
        let files: Vec<FileDescriptor> = entries.into_iter().filter(|e| e.is_file()).collect();
        debug!(
            backend = self.backend.name(),
            count = files.len(),
            "Fetching record files"
        );

        let listed: Vec<ListedEntry> = stream::iter(files)
            .map(|entry| async move { self.fetch_listed(config, entry).await })
            .buffer_unordered(self.fetch_concurrency)
            .filter_map(|entry| async move { entry })
            .collect()
            .await;

        info!("Loaded {} plates", listed.len());
        Ok(listed)
    }

    async fn fetch_listed(
        &self,
        config: &StoreConfig,
        entry: FileDescriptor,
    ) -> Option<ListedEntry> {
        let file = match self.backend.fetch_entry(config, &entry).await {
            Ok(Some(file)) => file,
            Ok(None) => {
                debug!(path = %entry.path, "Record file vanished during listing");
                return None;
            }
            Err(e) => {
                warn!(path = %entry.path, "Skipping record file: {}", e);
                return None;
            }
        };

        let text = match decode_content(&file.content) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %entry.path, "Skipping undecodable record file: {}", e);
                return None;
            }
        };

        let body = match serde_json::from_str(&text) {
            Ok(value) => EntryBody::Parsed(value),
            Err(_) => EntryBody::Raw(text),
        };
        Some(ListedEntry {
            path: entry.path,
            body,
            handle: file.handle,
        })
    }

    /// Fetch the record stored under `plate_key`.
    ///
    /// Returns `None` when no such file exists.
    pub async fn get(
        &self,
        config: &StoreConfig,
        plate_key: &str,
    ) -> Result<Option<(PlateRecord, VersionHandle)>> {
        config.validate()?;
        let path = self.layout.path_for(plate_key);
        let Some(RemoteFile { content, handle, .. }) =
            self.backend.get_file(config, &path).await?
        else {
            debug!(%path, "No record file");
            return Ok(None);
        };

        let text = decode_content(&content)?;
        let record: PlateRecord = serde_json::from_str(&text)?;
        Ok(Some((record, handle)))
    }

    /// Create or replace a record.
    ///
    /// Without a handle the file must not exist yet. With one, the store
    /// rejects the write with [`Error::Conflict`] if the file changed since it
    /// was read. No fresh handle is returned; read again before the next update.
    pub async fn put(
        &self,
        config: &StoreConfig,
        record: &PlateRecord,
        handle: Option<&VersionHandle>,
    ) -> Result<()> {
        config.validate()?;
        if record.plate.is_empty() {
            return Err(Error::InvalidRecord("plate is empty".to_string()));
        }
        if plate::normalize(&record.plate) != record.plate {
            return Err(Error::InvalidRecord(format!(
                "plate {:?} is not in canonical form",
                record.plate
            )));
        }

        let path = self.layout.path_for(&record.plate);
        let message = match handle {
            Some(_) => format!("Update plate {}", record.plate),
            None => format!("Add plate {}", record.plate),
        };
        let request = PutFileRequest {
            message,
            content: encode_content(record)?,
            handle: handle.cloned(),
        };

        match self.backend.put_file(config, &path, request).await {
            Ok(()) => {
                info!(%path, "Saved plate to repo");
                Ok(())
            }
            Err(e) => {
                if e.is_conflict() {
                    warn!(%path, "Stale version, plate changed since it was read");
                } else {
                    warn!(%path, "Save failed: {}", e);
                }
                Err(e)
            }
        }
    }
}

/// Decode base64 transport content, ignoring line wrapping
pub fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.split_whitespace().collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    String::from_utf8(bytes).map_err(|e| Error::Decode(format!("content is not UTF-8: {}", e)))
}

/// Encode a record as base64 of its pretty-printed JSON
pub fn encode_content(record: &PlateRecord) -> Result<String> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn config() -> StoreConfig {
        StoreConfig::new("acme", "plates")
    }

    #[test]
    fn test_layout_paths() {
        let layout = RecordLayout::default();
        assert_eq!(layout.path_for("AB12CDE"), "plates/AB12CDE.json");
        assert_eq!(layout.path_for("A B"), "plates/A%20B.json");
        assert_eq!(layout.key_from_path("plates/AB12CDE.json"), "AB12CDE");
        assert_eq!(layout.key_from_path("plates/README"), "README");
        assert_eq!(layout.key_from_path("elsewhere/X.json"), "elsewhere/X");
    }

    #[test]
    fn test_content_encoding_is_pretty_json() {
        let record = PlateRecord::new("A1");
        let text = decode_content(&encode_content(&record).unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"plate\": \"A1\""));
    }

    #[test]
    fn test_decode_tolerates_wrapped_base64() {
        assert_eq!(decode_content("aGVs\nbG8=\n").unwrap(), "hello");
        assert!(decode_content("!!!").is_err());
        assert!(matches!(decode_content("/w=="), Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_put_rejects_non_canonical_plate() {
        let store = RecordStore::new(MemoryBackend::new());
        let err = store
            .put(&config(), &PlateRecord::new("ab 12"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));

        let err = store
            .put(&config(), &PlateRecord::new(""), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(store.backend().is_empty());
    }

    #[tokio::test]
    async fn test_operations_require_complete_config() {
        let store = RecordStore::new(MemoryBackend::new());
        let incomplete = StoreConfig::new("", "plates");
        assert!(matches!(
            store.list(&incomplete).await,
            Err(Error::Config(_))
        ));
        assert!(matches!(
            store.get(&incomplete, "A1").await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_listed_entry_accessors() {
        let backend = MemoryBackend::new();
        backend.insert_text("main", "plates/A1.json", r#"{"plate":"A1","notes":"x"}"#);
        backend.insert_text("main", "plates/B2.json", r#"{"plate":""}"#);
        backend.insert_text("main", "plates/C3.json", "not json");
        let store = RecordStore::new(backend).with_fetch_concurrency(0);

        let mut listed = store.list(&config()).await.unwrap();
        listed.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(listed[0].plate_field(), Some("A1"));
        assert_eq!(listed[0].record().map(|r| r.notes).as_deref(), Some("x"));
        assert_eq!(listed[1].plate_field(), None);
        assert_eq!(listed[2].body, EntryBody::Raw("not json".to_string()));
        assert!(listed[2].record().is_none());
    }
}
