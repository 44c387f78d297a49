//! Entry pool: turns the registration list of one class into draw input.

use crate::error::{DrawError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type EntryId = String;

/// Entries without a club never conflict with anyone.
pub const NO_CLUB: &str = "";

/// Registration status as delivered by the entry subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Entered,
    Withdrawn,
    NotStarting,
}

impl EntryStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "entered" | "ok" => Some(EntryStatus::Entered),
            "withdrawn" => Some(EntryStatus::Withdrawn),
            "not_starting" | "dns" => Some(EntryStatus::NotStarting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: EntryId,
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: EntryStatus,
}

impl RawEntry {
    pub fn new(id: impl Into<String>, club: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), club: club.into(), name: name.into(), status: EntryStatus::Entered }
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }
}

/// A competitor as the draw sees it. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub club: String,
    pub name: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, club: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), club: club.into().trim().to_string(), name: name.into() }
    }

    pub fn has_club(&self) -> bool {
        self.club != NO_CLUB
    }

    /// Two entries conflict when they share a real club.
    pub fn same_club(&self, other: &Entry) -> bool {
        self.has_club() && self.club == other.club
    }
}

/// Drops entries that are not starting, keeps registration order and
/// rejects duplicate ids among the retained entries.
pub fn normalize(raw: &[RawEntry]) -> Result<Vec<Entry>> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(raw.len());
    let mut entries = Vec::with_capacity(raw.len());

    for r in raw.iter().filter(|r| r.status == EntryStatus::Entered) {
        let id = r.id.trim();
        if id.is_empty() {
            return Err(DrawError::invalid("entries.id", "entry id must not be empty"));
        }
        if !seen.insert(id) {
            return Err(DrawError::invalid("entries.id", format!("duplicate entry id '{}'", id)));
        }
        entries.push(Entry::new(id, r.club.as_str(), r.name.as_str()));
    }

    Ok(entries)
}

/// Validates a list that is already in `Entry` shape.
pub fn ensure_unique_ids(entries: &[Entry]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
    for e in entries {
        if !seen.insert(e.id.as_str()) {
            return Err(DrawError::invalid("entries.id", format!("duplicate entry id '{}'", e.id)));
        }
    }
    Ok(())
}

/// Distinct real clubs in first-registration order.
pub fn distinct_clubs(entries: &[Entry]) -> Vec<&str> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| e.has_club())
        .map(|e| e.club.as_str())
        .filter(|c| seen.insert(*c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filters_withdrawn() {
        let raw = vec![
            RawEntry::new("1", "OK Linné", "Anna"),
            RawEntry::new("2", "IFK Lidingö", "Bo").with_status(EntryStatus::Withdrawn),
            RawEntry::new("3", "OK Linné", "Cecilia").with_status(EntryStatus::NotStarting),
            RawEntry::new("4", " Järla ", "David"),
        ];

        let entries = normalize(&raw).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(entries[1].club, "Järla");
    }

    #[test]
    fn test_normalize_rejects_duplicates() {
        let raw = vec![RawEntry::new("7", "A", "x"), RawEntry::new("7", "B", "y")];
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err.field(), Some("entries.id"));
    }

    #[test]
    fn test_withdrawn_duplicate_is_ignored() {
        let raw = vec![
            RawEntry::new("7", "A", "old").with_status(EntryStatus::Withdrawn),
            RawEntry::new("7", "A", "new"),
        ];
        let entries = normalize(&raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "new");
    }

    #[test]
    fn test_empty_club_never_conflicts() {
        let a = Entry::new("1", "", "a");
        let b = Entry::new("2", "", "b");
        let c = Entry::new("3", "X", "c");
        let d = Entry::new("4", "X", "d");
        assert!(!a.same_club(&b));
        assert!(c.same_club(&d));
    }

    #[test]
    fn test_new_trims_owned_and_borrowed_clubs() {
        let owned = Entry::new("1", String::from("  OK Linné "), "a");
        let borrowed = Entry::new("2", "OK Linné\t", "b");
        let blank = Entry::new("3", "   ", "c");

        assert_eq!(owned.club, "OK Linné");
        assert!(owned.same_club(&borrowed));
        assert!(!blank.has_club());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(EntryStatus::parse("DNS"), Some(EntryStatus::NotStarting));
        assert_eq!(EntryStatus::parse(""), Some(EntryStatus::Entered));
        assert_eq!(EntryStatus::parse("maybe"), None);
    }

    #[test]
    fn test_distinct_clubs_in_registration_order() {
        let entries = vec![
            Entry::new("1", "B", "x"),
            Entry::new("2", "A", "x"),
            Entry::new("3", "B", "x"),
            Entry::new("4", "", "x"),
        ];
        assert_eq!(distinct_clubs(&entries), vec!["B", "A"]);
    }
}
