use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HISTORY_ID_PREFIX: &str = "arty-ai-";

/// One past successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub prompt: String,
    pub image_url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            // v7 ids sort by creation time, so two entries in the same
            // millisecond still get distinct ids.
            id: format!("{}{}", HISTORY_ID_PREFIX, Uuid::now_v7().simple()),
            prompt: prompt.into(),
            image_url: image_url.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_get_unique_prefixed_ids() {
        let a = HistoryEntry::new("fox", "https://a");
        let b = HistoryEntry::new("fox", "https://a");
        assert!(a.id.starts_with(HISTORY_ID_PREFIX));
        assert_ne!(a.id, b.id);
        assert!(b.timestamp >= a.timestamp);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let entry = HistoryEntry {
            id: "arty-ai-1".into(),
            prompt: "fox".into(),
            image_url: "https://a".into(),
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["imageUrl"], "https://a");
        assert_eq!(value["timestamp"], 1_700_000_000_000_i64);
    }
}
