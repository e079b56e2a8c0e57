//! JSON snapshot document shared by the primary file, daily logs and backups.

use crate::core::{Activity, DayRecord, MAX_HOUR, Result, StoreError};
use crate::storage::RecordStore;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Textual form of dates used as `studyData` keys and log file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Wire Types
// ============================================================================

/// Top-level document. `M` and `D` are typed on encode and raw JSON on
/// decode, so a bad streak or a bad day can be dropped on its own.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "M: Deserialize<'de> + Default, D: Deserialize<'de>"))]
struct SnapshotDocument<M, D> {
    #[serde(default)]
    max_continuous_days: M,
    study_data: D,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
struct DayDocument<T> {
    #[serde(default)]
    study_hours: u32,
    #[serde(default)]
    completed_projects: u32,
    #[serde(default)]
    total_projects: u32,
    #[serde(default)]
    time_axis_data: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityDocument {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    is_completed: bool,
}

type EncodedDay = DayDocument<BTreeMap<String, ActivityDocument>>;
type RawDay = DayDocument<Map<String, Value>>;

// ============================================================================
// Snapshot Codec
// ============================================================================

/// Decoded snapshot contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub store: RecordStore,
    pub max_continuous_days: u32,
}

pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Compact JSON for every entry in `store`.
    pub fn encode(store: &RecordStore, max_continuous_days: u32) -> Result<Vec<u8>> {
        Self::encode_entries(store.iter(), max_continuous_days)
    }

    /// Compact JSON for the single entry at `date` (or an empty `studyData`
    /// when the store has nothing for that day).
    pub fn encode_day(store: &RecordStore, date: NaiveDate, max_continuous_days: u32) -> Result<Vec<u8>> {
        let entry = store.peek(date).map(|record| (&date, record));
        Self::encode_entries(entry.into_iter(), max_continuous_days)
    }

    fn encode_entries<'a>(
        entries: impl Iterator<Item = (&'a NaiveDate, &'a DayRecord)>,
        max_continuous_days: u32,
    ) -> Result<Vec<u8>> {
        let study_data: BTreeMap<String, EncodedDay> = entries
            .map(|(date, record)| (date.format(DATE_FORMAT).to_string(), encode_day(record)))
            .collect();

        let document = SnapshotDocument {
            max_continuous_days,
            study_data,
        };
        serde_json::to_vec(&document)
            .map_err(|e| StoreError::ParseError(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Parse a snapshot document.
    ///
    /// Malformed JSON or a missing `studyData` object fails the whole decode.
    /// Individual dates, days or hours that do not parse are logged and
    /// skipped.
    pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
        let document: SnapshotDocument<Value, Map<String, Value>> = serde_json::from_slice(bytes)
            .map_err(|e| StoreError::ParseError(format!("Failed to deserialize snapshot: {}", e)))?;

        let mut store = RecordStore::new();
        for (key, value) in document.study_data {
            let Ok(date) = NaiveDate::parse_from_str(&key, DATE_FORMAT) else {
                warn!("Skipping entry with invalid date key '{}'", key);
                continue;
            };
            match serde_json::from_value::<RawDay>(value) {
                Ok(raw) => store.set(date, decode_day(&key, raw)),
                Err(e) => warn!("Skipping malformed day '{}': {}", key, e),
            }
        }

        Ok(Snapshot {
            store,
            max_continuous_days: decode_max_streak(&document.max_continuous_days),
        })
    }
}

/// A missing streak is 0. Anything else that is not a `u32` is logged and
/// read as 0 rather than failing the history it sits next to.
fn decode_max_streak(value: &Value) -> u32 {
    if value.is_null() {
        return 0;
    }
    match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(days) => days,
        None => {
            warn!("Ignoring invalid maxContinuousDays {}", value);
            0
        }
    }
}

fn encode_day(record: &DayRecord) -> EncodedDay {
    DayDocument {
        study_hours: record.study_hours,
        completed_projects: record.completed_count,
        total_projects: record.total_count,
        time_axis_data: record
            .timeline
            .iter()
            .map(|(hour, activity)| {
                (
                    hour.to_string(),
                    ActivityDocument {
                        kind: activity.kind.clone(),
                        is_completed: activity.completed,
                    },
                )
            })
            .collect(),
    }
}

fn decode_day(date_key: &str, raw: RawDay) -> DayRecord {
    let mut timeline = BTreeMap::new();
    for (hour_key, value) in raw.time_axis_data {
        let hour = match hour_key.parse::<u8>() {
            Ok(hour) if hour <= MAX_HOUR => hour,
            _ => {
                warn!("Skipping invalid hour key '{}' on {}", hour_key, date_key);
                continue;
            }
        };
        match serde_json::from_value::<ActivityDocument>(value) {
            Ok(doc) => {
                timeline.insert(hour, Activity::new(doc.kind, doc.is_completed));
            }
            Err(e) => warn!("Skipping malformed activity at {} on {}: {}", hour, date_key, e),
        }
    }

    DayRecord {
        study_hours: raw.study_hours,
        completed_count: raw.completed_projects,
        total_count: raw.total_projects,
        timeline,
    }
}
