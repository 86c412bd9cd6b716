//! # Plates Core
//!
//! Vehicle-plate records kept in a remote versioned file store, one file per
//! plate, with optimistic concurrency on every write.
//!
//! This crate provides:
//! - Normalization (`plate`) - Canonical plate keys and advisory validation
//! - Records (`record`) - The persisted record and its version handle
//! - Backends (`backend`) - Capability trait over the remote store, plus an in-memory store
//! - Record store (`store`) - List, get and conditional put of records
//! - Listing (`listing`) - Filter and sort fetched records for display
//! - Service (`service`) - Lookup and save workflow
//! - Configuration (`config`) - Store coordinates and their local persistence

#![warn(missing_docs)]

pub mod backend;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod plate;
pub mod record;
pub mod service;
pub mod store;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::backend::{
        FileBackend, FileDescriptor, MemoryBackend, PutFileRequest, RemoteFile,
    };
    pub use crate::config::{ConfigFile, StoreConfig};
    pub use crate::error::{Error, Result};
    pub use crate::listing::{display_key, project, ListingRow};
    pub use crate::plate::{is_plausible, normalize, ValidationWarning};
    pub use crate::record::{PlateDraft, PlateRecord, VersionHandle};
    pub use crate::service::{Lookup, PlateService};
    pub use crate::store::{EntryBody, ListedEntry, RecordLayout, RecordStore};
}
