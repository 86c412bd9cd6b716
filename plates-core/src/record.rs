//! Plate records and version handles

use serde::{Deserialize, Serialize};

/// The persisted unit: one file per canonical plate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateRecord {
    /// Canonical plate, the record's identity
    pub plate: String,
    /// Registered keeper, free text
    #[serde(default)]
    pub owner: String,
    /// Free text notes
    #[serde(default)]
    pub notes: String,
    /// ISO-8601 timestamp of the last write
    #[serde(default)]
    pub added_at: String,
    /// Login of the writer, empty when it could not be resolved
    #[serde(default)]
    pub added_by: String,
    /// Whether the plate is flagged
    #[serde(default)]
    pub flagged: bool,
    /// Reason for the flag, only meaningful when `flagged`
    #[serde(default)]
    pub flag_reason: String,
}

impl PlateRecord {
    /// Blank record for a canonical plate
    pub fn new(plate: impl Into<String>) -> Self {
        Self {
            plate: plate.into(),
            owner: String::new(),
            notes: String::new(),
            added_at: String::new(),
            added_by: String::new(),
            flagged: false,
            flag_reason: String::new(),
        }
    }

    /// Editable fields of this record
    pub fn draft(&self) -> PlateDraft {
        PlateDraft {
            owner: self.owner.clone(),
            notes: self.notes.clone(),
            flagged: self.flagged,
            flag_reason: self.flag_reason.clone(),
        }
    }
}

/// User-editable part of a record.
///
/// `addedAt` and `addedBy` are stamped at save time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlateDraft {
    /// Registered keeper
    pub owner: String,
    /// Free text notes
    pub notes: String,
    /// Whether the plate is flagged
    pub flagged: bool,
    /// Reason for the flag
    pub flag_reason: String,
}

impl PlateDraft {
    /// Trim free text the way form input is trimmed before saving
    pub fn trimmed(self) -> Self {
        Self {
            owner: self.owner.trim().to_string(),
            notes: self.notes.trim().to_string(),
            flagged: self.flagged,
            flag_reason: self.flag_reason.trim().to_string(),
        }
    }
}

/// Opaque token for the version of a file last seen by the caller.
///
/// Passed back unchanged on write so the store can reject stale updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionHandle(String);

impl VersionHandle {
    /// Wrap a token issued by a backend
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for backends that must send it back
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_camel_case_keys() {
        let mut record = PlateRecord::new("AB12CDE");
        record.flagged = true;
        record.flag_reason = "stolen".to_string();
        record.added_at = "2024-05-01T10:00:00.000Z".to_string();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["plate"], "AB12CDE");
        assert_eq!(value["addedAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(value["addedBy"], "");
        assert_eq!(value["flagReason"], "stolen");
        assert_eq!(value["flagged"], true);
    }

    #[test]
    fn test_record_tolerates_missing_optional_fields() {
        let record: PlateRecord = serde_json::from_str(r#"{"plate":"A1","notes":"n"}"#).unwrap();
        assert_eq!(record.plate, "A1");
        assert_eq!(record.notes, "n");
        assert!(record.owner.is_empty());
        assert!(!record.flagged);
    }

    #[test]
    fn test_draft_trims_text() {
        let draft = PlateDraft {
            owner: "  Jo ".to_string(),
            notes: "\tblue van\n".to_string(),
            flagged: true,
            flag_reason: " seen twice ".to_string(),
        }
        .trimmed();
        assert_eq!(draft.owner, "Jo");
        assert_eq!(draft.notes, "blue van");
        assert_eq!(draft.flag_reason, "seen twice");
    }

    #[test]
    fn test_handle_serializes_as_plain_string() {
        let handle = VersionHandle::new("abc123");
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"abc123\"");
        assert_eq!(handle.as_str(), "abc123");
    }
}
