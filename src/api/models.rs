use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_uploader_name() -> String {
    "Unknown".to_string()
}

/// Account that published a feed item. The catalog sometimes omits the
/// uploader entirely, so every field falls back to a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uploader {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default = "default_uploader_name")]
    pub name: String,
}

impl Default for Uploader {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: default_uploader_name(),
        }
    }
}

/// One playable entry returned by the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FeedItem {
    #[serde(alias = "_id")]
    pub id: String,
    /// Locale code -> display title. At least one entry expected.
    #[serde(default)]
    pub title: HashMap<String, String>,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(default, alias = "previewUrl")]
    pub preview_url: String,
    /// Playable media URI, either an HLS manifest or a progressive file.
    #[serde(default)]
    pub url: String,
    /// Seconds. 0 or non-finite marks a live/unknown-duration stream.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "uploadedBy")]
    pub uploaded_by: Uploader,
}

impl FeedItem {
    /// Title for the given locale, falling back to English and then to any
    /// entry the catalog happened to send.
    pub fn title_for(&self, locale: &str) -> &str {
        self.title
            .get(locale)
            .or_else(|| self.title.get("en"))
            .or_else(|| self.title.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Envelope of `GET /video/random`.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomVideosResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<FeedItem>,
    #[serde(default)]
    pub message: String,
}

/// mm:ss timecode used by the progress bar. Non-finite inputs render 00:00.
pub fn format_timecode(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Compact count for the action rail (1.2K, 3.4M).
pub fn format_count(count: u64) -> String {
    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => format!("{:.1}K", count as f64 / 1_000.0),
        _ => format!("{:.1}M", count as f64 / 1_000_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_falls_back_locale_then_en_then_any() {
        let mut item = FeedItem::default();
        item.title.insert("th".to_string(), "ไทย".to_string());
        assert_eq!(item.title_for("th"), "ไทย");
        assert_eq!(item.title_for("de"), "ไทย");

        item.title.insert("en".to_string(), "English".to_string());
        assert_eq!(item.title_for("de"), "English");
        assert_eq!(item.title_for("th"), "ไทย");

        assert_eq!(FeedItem::default().title_for("en"), "");
    }

    #[test]
    fn uploader_defaults_to_unknown() {
        let raw = r#"{"_id":"v1","url":"https://cdn.test/v1.m3u8"}"#;
        let item: FeedItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.uploaded_by.name, "Unknown");
        assert_eq!(item.id, "v1");

        let raw = r#"{"_id":"v2","url":"x","uploadedBy":{"_id":"u9"}}"#;
        let item: FeedItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.uploaded_by.id, "u9");
        assert_eq!(item.uploaded_by.name, "Unknown");
    }

    #[test]
    fn timecode_formatting() {
        assert_eq!(format_timecode(0.0), "00:00");
        assert_eq!(format_timecode(61.7), "01:01");
        assert_eq!(format_timecode(f64::NAN), "00:00");
        assert_eq!(format_timecode(f64::INFINITY), "00:00");
    }
}
