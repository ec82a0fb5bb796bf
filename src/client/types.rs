//! Wire types for the Radarr/Sonarr v3 APIs.
//!
//! Only the fields the cleanup engine reads are modelled; everything else in
//! the payload is ignored. All fields are optional or defaulted so that a
//! partially filled record never fails the whole listing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `"tags": null` reads as no tags.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EpisodeFile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "seriesId", default)]
    pub series_id: Option<i64>,
    #[serde(rename = "relativePath", default)]
    pub relative_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "dateAdded", default)]
    pub date_added: Option<String>,
    #[serde(rename = "date_added", default, skip_serializing_if = "Option::is_none")]
    pub date_added_snake: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<String>,
}

impl EpisodeFile {
    /// The raw "added" timestamp, preferring `dateAdded` over older spellings.
    pub fn added_raw(&self) -> Option<&str> {
        [&self.date_added, &self.date_added_snake, &self.added]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|s| !s.is_empty())
    }

    /// Path to show in run records: relative path if known, else full path.
    pub fn display_path(&self) -> String {
        self.relative_path
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.path.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub instance_name: Option<String>,
}

/// Parse a remote ISO-8601 timestamp into UTC.
///
/// Offsets (including a trailing `Z`) are honoured; naive timestamps and bare
/// dates are taken as UTC. Anything unparsable is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
