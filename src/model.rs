// src/model.rs

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;

/// Version label used for every commit seen before the first release marker
pub const DEFAULT_VERSION: &str = "0.0.0";

/// A single commit as handed over by the commit source
#[derive(Debug, Clone)]
pub struct CommitRecord {
    pub message: String,
    pub author_date: DateTime<FixedOffset>,
    pub is_main_branch: bool,
}

impl CommitRecord {
    /// The `YYYY-MM-DD` label of the author date, in the author's own offset
    pub fn date_label(&self) -> String {
        self.author_date.format("%Y-%m-%d").to_string()
    }
}

/// Maps a date label to the normalized messages recorded on that day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateBucket {
    dates: IndexMap<String, Vec<String>>,
}

impl DateBucket {
    /// Returns the message list for `date`, creating an empty one if needed
    pub fn get_or_create(&mut self, date: &str) -> &mut Vec<String> {
        self.dates.entry(date.to_string()).or_default()
    }

    /// Appends `message` under `date` unless the same text is already there.
    /// Returns whether the message was added.
    pub fn push_unique(&mut self, date: &str, message: String) -> bool {
        let messages = self.get_or_create(date);
        if messages.contains(&message) {
            return false;
        }
        messages.push(message);
        true
    }

    #[cfg(test)]
    pub fn get(&self, date: &str) -> Option<&[String]> {
        self.dates.get(date).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.dates.iter().map(|(d, m)| (d.as_str(), m.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// The version -> date -> messages accumulator built from the commit history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionLedger {
    versions: IndexMap<String, DateBucket>,
}

impl VersionLedger {
    /// A ledger holding only the implicit `0.0.0` entry
    pub fn new() -> Self {
        let mut versions = IndexMap::new();
        versions.insert(DEFAULT_VERSION.to_string(), DateBucket::default());
        Self { versions }
    }

    /// Returns the bucket for `version`, creating an empty one if needed
    pub fn get_or_create(&mut self, version: &str) -> &mut DateBucket {
        self.versions.entry(version.to_string()).or_default()
    }

    #[cfg(test)]
    pub fn get(&self, version: &str) -> Option<&DateBucket> {
        self.versions.get(version)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DateBucket)> {
        self.versions.iter().map(|(v, b)| (v.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }
}

impl Default for VersionLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_ledger_has_default_version() {
        let ledger = VersionLedger::new();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(DEFAULT_VERSION).unwrap().is_empty());
    }

    #[test]
    fn test_push_unique_keeps_first_occurrence() {
        let mut bucket = DateBucket::default();
        assert!(bucket.push_unique("2024-01-02", "Fix: a".to_string()));
        assert!(bucket.push_unique("2024-01-02", "Fix: b".to_string()));
        assert!(!bucket.push_unique("2024-01-02", "Fix: a".to_string()));
        assert!(bucket.push_unique("2024-01-03", "Fix: a".to_string()));

        assert_eq!(bucket.get("2024-01-02").unwrap(), ["Fix: a", "Fix: b"]);
        assert_eq!(bucket.get("2024-01-03").unwrap(), ["Fix: a"]);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut ledger = VersionLedger::new();
        ledger.get_or_create("1.0.0").push_unique("2024-01-02", "x".to_string());
        ledger.get_or_create("1.0.0");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("1.0.0").unwrap().len(), 1);
    }

    #[test]
    fn test_date_label_uses_author_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let commit = CommitRecord {
            message: "late night fix".to_string(),
            author_date: offset.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap(),
            is_main_branch: true,
        };
        // 04:30 UTC on the 2nd, but the author was still on the 1st
        assert_eq!(commit.date_label(), "2024-03-01");
    }
}
