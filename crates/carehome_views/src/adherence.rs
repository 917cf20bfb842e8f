//! Daily medication-adherence computation.
//!
//! Expected dose counts are derived from the free-text frequency field staff
//! enter on each medication. The phrases are matched case-insensitively in a
//! fixed priority order; the phrases are not mutually exclusive ("una vez"
//! beats "cada 12 horas" when both appear), so the table must stay an ordered
//! sequence rather than a map.

use carehome_store_client::{AdministrationRecord, Medication};
use chrono::NaiveDate;
use serde::Serialize;

/// Priority table of (lowercase phrase, daily dose count). First match wins.
const FREQUENCY_RULES: &[(&str, u32)] = &[
    ("una vez", 1),
    ("dos veces", 2),
    ("tres veces", 3),
    ("cada 8 horas", 3),
    ("cada 12 horas", 2),
    ("según necesidad", 5),
];

const DEFAULT_DAILY_DOSES: u32 = 1;

/// Number of doses expected per day for a frequency descriptor.
/// Unrecognized or empty text falls back to 1.
pub fn expected_daily_doses(frequency: &str) -> u32 {
    let lowered = frequency.to_lowercase();
    for &(phrase, count) in FREQUENCY_RULES {
        if lowered.contains(phrase) {
            return count;
        }
    }
    DEFAULT_DAILY_DOSES
}

/// One local calendar day as inclusive ISO-8601 string bounds:
/// `[dateT00:00:00, dateT23:59:59]`.
///
/// The upper bound is inclusive to the second, so a record stamped inside the
/// final second's fraction (e.g. `23:59:59.500`) falls outside the window.
/// That boundary choice is inherited and kept as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayWindow {
    pub start: String,
    pub end: String,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            start: format!("{}T00:00:00", date.format("%Y-%m-%d")),
            end: format!("{}T23:59:59", date.format("%Y-%m-%d")),
        }
    }

    pub fn today() -> Self {
        Self::for_date(chrono::Local::now().date_naive())
    }

    /// Lexicographic containment; correct because all timestamps involved are
    /// ISO-8601 strings.
    pub fn contains(&self, timestamp: &str) -> bool {
        self.start.as_str() <= timestamp && timestamp <= self.end.as_str()
    }
}

/// Per-medication adherence for one day. Derived, never persisted.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AdherenceStatus {
    pub medication_id: String,
    pub expected_doses: u32,
    pub administered_today: u32,
    pub can_administer: bool,
    pub last_administered_at: Option<String>,
}

/// Reconcile a medication against the day's administration log.
///
/// Counts every record referencing the medication inside the window — there is
/// no upper clamp, so over-administration shows up as `administered_today >
/// expected_doses` with `can_administer == false`. Total over its inputs:
/// always returns a status.
pub fn compute_status(
    medication: &Medication,
    administrations: &[AdministrationRecord],
    window: &DayWindow,
) -> AdherenceStatus {
    let expected = expected_daily_doses(&medication.frequency);

    let mut administered = 0u32;
    let mut last: Option<&str> = None;
    for record in administrations {
        if record.medication_id != medication.id || !window.contains(&record.administered_at) {
            continue;
        }
        administered += 1;
        if last.is_none_or(|prev| record.administered_at.as_str() > prev) {
            last = Some(&record.administered_at);
        }
    }

    AdherenceStatus {
        medication_id: medication.id.clone(),
        expected_doses: expected,
        administered_today: administered,
        can_administer: administered < expected,
        last_administered_at: last.map(str::to_string),
    }
}
