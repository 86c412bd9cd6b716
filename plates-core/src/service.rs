//! Lookup and save workflow
//!
//! Glues the normalizer, the record store and the listing projector into the
//! three user-facing actions: look a plate up, save it, refresh the list.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::backend::FileBackend;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::listing::{self, ListingRow};
use crate::plate::{self, ValidationWarning};
use crate::record::{PlateDraft, PlateRecord, VersionHandle};
use crate::store::RecordStore;

/// Outcome of looking a plate up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Canonical plate
    pub plate: String,
    /// Present when the plate failed the plausibility check
    pub warning: Option<ValidationWarning>,
    /// Stored record and its version, if the plate is already known
    pub existing: Option<(PlateRecord, VersionHandle)>,
}

impl Lookup {
    /// Fields to pre-fill an edit form with
    pub fn draft(&self) -> PlateDraft {
        self.existing
            .as_ref()
            .map(|(record, _)| record.draft())
            .unwrap_or_default()
    }

    /// Version to pass back when saving
    pub fn handle(&self) -> Option<&VersionHandle> {
        self.existing.as_ref().map(|(_, handle)| handle)
    }
}

/// User-facing plate operations over a record store
pub struct PlateService<B: FileBackend> {
    store: RecordStore<B>,
}

impl<B: FileBackend> PlateService<B> {
    /// Create a service over a record store
    pub fn new(store: RecordStore<B>) -> Self {
        Self { store }
    }

    /// Underlying record store
    pub fn store(&self) -> &RecordStore<B> {
        &self.store
    }

    /// Normalize raw input and fetch the matching record.
    ///
    /// An implausible plate is still looked up; the warning rides along.
    /// Input that normalizes to nothing has no storage path, so it is
    /// rejected with [`Error::InvalidRecord`] before the store is touched.
    pub async fn lookup(&self, config: &StoreConfig, raw: &str) -> Result<Lookup> {
        let check = plate::check(raw);
        if check.plate.is_empty() {
            return Err(Error::InvalidRecord("enter a plate first".to_string()));
        }
        if let Some(warning) = &check.warning {
            warn!("{}. Still trying lookup", warning);
        }

        let existing = self.store.get(config, &check.plate).await?;
        match &existing {
            Some(_) => info!(plate = %check.plate, "Loaded existing plate"),
            None => info!(plate = %check.plate, "No existing plate found"),
        }

        Ok(Lookup {
            plate: check.plate,
            warning: check.warning,
            existing,
        })
    }

    /// Stamp a draft and write it.
    ///
    /// `handle` is the version from the preceding lookup, `None` for a new
    /// plate. The writer's identity is resolved best-effort when a token is
    /// configured; failing to resolve it leaves `addedBy` empty.
    pub async fn save(
        &self,
        config: &StoreConfig,
        plate: &str,
        draft: PlateDraft,
        handle: Option<&VersionHandle>,
    ) -> Result<PlateRecord> {
        let plate = plate.trim();
        if plate.is_empty() {
            return Err(Error::InvalidRecord("no plate to save".to_string()));
        }

        let draft = draft.trimmed();
        let record = PlateRecord {
            plate: plate.to_string(),
            owner: draft.owner,
            notes: draft.notes,
            added_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            added_by: self.resolve_identity(config).await,
            flagged: draft.flagged,
            flag_reason: draft.flag_reason,
        };

        self.store.put(config, &record, handle).await?;
        Ok(record)
    }

    async fn resolve_identity(&self, config: &StoreConfig) -> String {
        if !config.has_credentials() {
            return String::new();
        }
        match self.store.backend().current_user(config).await {
            Ok(Some(login)) => login,
            Ok(None) => String::new(),
            Err(e) => {
                debug!("Could not resolve current user: {}", e);
                String::new()
            }
        }
    }

    /// List every record and project it for display
    pub async fn refresh(&self, config: &StoreConfig, filter: &str) -> Result<Vec<ListingRow>> {
        let entries = self.store.list(config).await?;
        Ok(listing::rows(&entries, filter, self.store.layout()))
    }
}
