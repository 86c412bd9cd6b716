//! Listing projection: filter and sort fetched records for display
//!
//! Pure functions over the output of [`RecordStore::list`](crate::store::RecordStore::list).

use crate::store::{ListedEntry, RecordLayout};

/// Key an entry is shown and sorted under.
///
/// The body's `plate` when it parsed as JSON and carries one, otherwise the
/// key derived from the storage path.
pub fn display_key<'a>(entry: &'a ListedEntry, layout: &RecordLayout) -> &'a str {
    entry
        .plate_field()
        .unwrap_or_else(|| layout.key_from_path(&entry.path))
}

/// Filter entries by display key and sort them ascending.
///
/// An empty filter keeps everything; otherwise an entry is kept when its
/// uppercased display key contains the (trimmed, uppercased) filter. Sorting
/// is stable, so equal keys keep their input order.
pub fn project<'a>(
    entries: &'a [ListedEntry],
    filter: &str,
    layout: &RecordLayout,
) -> Vec<&'a ListedEntry> {
    let filter = filter.trim().to_uppercase();
    let mut keyed: Vec<(&str, &ListedEntry)> = entries
        .iter()
        .map(|entry| (display_key(entry, layout), entry))
        .filter(|(key, _)| filter.is_empty() || key.to_uppercase().contains(&filter))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(b.0));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

/// Summary of one entry as shown in a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Display key
    pub plate: String,
    /// Notes, empty if none
    pub notes: String,
    /// Whether the record is flagged
    pub flagged: bool,
    /// Flag reason, empty if none
    pub flag_reason: String,
    /// Timestamp of the last write, `unknown` if missing
    pub added_at: String,
}

impl ListingRow {
    /// Summarize an entry
    pub fn from_entry(entry: &ListedEntry, layout: &RecordLayout) -> Self {
        let json = entry.json();
        let text = |field: &str| {
            json.and_then(|v| v.get(field))
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let added_at = text("addedAt");

        Self {
            plate: display_key(entry, layout).to_string(),
            notes: text("notes"),
            flagged: json
                .and_then(|v| v.get("flagged"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            flag_reason: text("flagReason"),
            added_at: if added_at.is_empty() {
                "unknown".to_string()
            } else {
                added_at
            },
        }
    }
}

/// Project entries straight to display rows
pub fn rows(entries: &[ListedEntry], filter: &str, layout: &RecordLayout) -> Vec<ListingRow> {
    project(entries, filter, layout)
        .into_iter()
        .map(|entry| ListingRow::from_entry(entry, layout))
        .collect()
}
