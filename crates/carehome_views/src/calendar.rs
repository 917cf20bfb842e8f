//! Calendar bucketing: group timestamped records by local date.
//!
//! One parameterized implementation serves activities, vital signs and
//! medication history; callers only supply the accessor for the record's
//! timestamp field.

use crate::error::{ViewsError, ViewsResult};
use std::collections::BTreeMap;

/// Group records under `YYYY-MM-DD` keys taken from the first ten characters
/// of each record's timestamp. Relative input order is preserved within each
/// bucket; an empty input yields an empty map.
///
/// The key derivation is textual, so the timestamp must already be ISO-8601
/// (`YYYY-MM-DDTHH:MM:SS...`). Anything else is rejected with
/// [`ViewsError::MalformedTimestamp`] instead of silently mis-keying.
pub fn bucket_by_date<T, F>(records: Vec<T>, timestamp_of: F) -> ViewsResult<BTreeMap<String, Vec<T>>>
where
    F: Fn(&T) -> &str,
{
    let mut buckets: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for record in records {
        let key = date_key(timestamp_of(&record))?.to_string();
        buckets.entry(key).or_default().push(record);
    }
    Ok(buckets)
}

/// First ten characters of an ISO-8601 timestamp, validated to look like a
/// calendar date.
fn date_key(timestamp: &str) -> ViewsResult<&str> {
    let key = timestamp
        .get(..10)
        .ok_or_else(|| ViewsError::MalformedTimestamp(timestamp.to_string()))?;
    let bytes = key.as_bytes();
    let shape_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    // A date-only value is fine; anything longer must continue with 'T'.
    let separator_ok = matches!(timestamp.as_bytes().get(10), None | Some(b'T'));
    if !shape_ok || !separator_ok {
        return Err(ViewsError::MalformedTimestamp(timestamp.to_string()));
    }
    Ok(key)
}

/// Half-open month window `[YYYY-MM-01, first day of next month)` with
/// explicit December→January rollover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthRange {
    pub start: String,
    pub end_exclusive: String,
}

impl MonthRange {
    pub fn new(year: i32, month: u32) -> ViewsResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ViewsError::InvalidMonth(month));
        }
        let start = format!("{year}-{month:02}-01");
        let end_exclusive = if month == 12 {
            format!("{}-01-01", year + 1)
        } else {
            format!("{year}-{:02}-01", month + 1)
        };
        Ok(Self {
            start,
            end_exclusive,
        })
    }

    /// `start <= timestamp < end`, lexicographic over ISO strings.
    pub fn contains(&self, timestamp: &str) -> bool {
        self.start.as_str() <= timestamp && timestamp < self.end_exclusive.as_str()
    }
}
