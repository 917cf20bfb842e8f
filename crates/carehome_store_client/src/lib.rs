//! Typed client for the hosted care-facility data store.
//!
//! The store speaks a tabular REST dialect: equality and range filters as
//! query parameters, ordering, offset/limit pagination, exact counts via the
//! `Content-Range` header, and a companion blob store for resident photos.
//! [`CareStore`] is the seam consumers program against; the reqwest-backed
//! implementation lives in [`http_client`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod retry;
pub mod storage;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl StoreError {
    pub fn from_status(status: u16, body: String) -> Self {
        StoreError::Status { status, body }
    }

    /// Transient failures are worth retrying; everything else is not.
    /// Connection and timeout problems, plus 5xx responses, qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http(e) => e.is_timeout() || e.is_connect(),
            StoreError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Resident {
    pub id: String,
    pub name: String,
    /// "independent" or "semidependent" in the current schema.
    pub status: String,
    pub photo_url: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub admission_date: String,
    pub discharge_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewResident {
    pub name: String,
    pub status: String,
    pub photo_url: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub admission_date: String,
    pub discharge_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub resident_id: String,
    pub med_name: String,
    pub dosage: String,
    /// Free-text dosing schedule as entered by staff, e.g. "dos veces al día".
    pub frequency: String,
    pub scheduled_time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewMedication {
    pub resident_id: String,
    pub med_name: String,
    pub dosage: String,
    pub frequency: String,
    pub scheduled_time: Option<String>,
    pub notes: Option<String>,
}

/// Append-only log entry recording that a dose was given. Carries a snapshot
/// of the medication fields at administration time so later edits to the
/// medication do not rewrite history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdministrationRecord {
    pub id: String,
    pub medication_id: String,
    pub resident_id: String,
    pub administered_at: String,
    pub administered_by_user_id: String,
    pub med_name: String,
    pub dosage: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewAdministrationRecord {
    pub medication_id: String,
    pub resident_id: String,
    pub administered_at: String,
    pub administered_by_user_id: String,
    pub med_name: String,
    pub dosage: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VitalSign {
    pub id: String,
    pub resident_id: String,
    pub recorded_at: String,
    pub blood_pressure: Option<String>,
    pub temperature: Option<f64>,
    pub pulse: Option<i32>,
    pub recorded_by_user_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewVitalSign {
    pub resident_id: String,
    pub recorded_at: String,
    pub blood_pressure: Option<String>,
    pub temperature: Option<f64>,
    pub pulse: Option<i32>,
    pub recorded_by_user_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub resident_id: String,
    pub activity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: String,
    pub completed_at: Option<String>,
    /// "scheduled", "completed" or "cancelled".
    pub status: String,
    pub notes: Option<String>,
    pub registered_by: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewActivity {
    pub resident_id: String,
    pub activity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: String,
    pub completed_at: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub registered_by: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FamilyContact {
    pub id: String,
    pub resident_id: String,
    pub name: String,
    pub relationship: String,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewFamilyContact {
    pub resident_id: String,
    pub name: String,
    pub relationship: String,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Time restriction applied when fetching administration history.
///
/// A `Day` filter is inclusive on both ends (`gte`/`lte`); a `Month` filter is
/// half-open (`gte`/`lt`). Bounds are naive ISO-8601 strings in the facility's
/// local time, compared textually by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeFilter {
    Day { start: String, end: String },
    Month { start: String, end_exclusive: String },
}

#[async_trait]
pub trait CareStore: Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn fetch_residents(&self) -> Result<Vec<Resident>, StoreError>;
    async fn fetch_resident(&self, resident_id: &str) -> Result<Resident, StoreError>;
    async fn create_resident(&self, resident: NewResident) -> Result<Resident, StoreError>;
    async fn update_resident(
        &self,
        resident_id: &str,
        resident: NewResident,
    ) -> Result<Resident, StoreError>;
    async fn delete_resident(&self, resident_id: &str) -> Result<(), StoreError>;

    async fn fetch_medications(&self, resident_id: &str) -> Result<Vec<Medication>, StoreError>;
    async fn create_medication(&self, medication: NewMedication)
    -> Result<Medication, StoreError>;
    async fn update_medication(
        &self,
        medication_id: &str,
        medication: NewMedication,
    ) -> Result<Medication, StoreError>;
    async fn delete_medication(&self, medication_id: &str) -> Result<(), StoreError>;

    /// Insert an administration log entry. The table is append-only: there is
    /// deliberately no update or delete counterpart.
    async fn record_administration(
        &self,
        entry: NewAdministrationRecord,
    ) -> Result<AdministrationRecord, StoreError>;
    /// History for one resident inside the given window, newest first.
    async fn fetch_administrations(
        &self,
        resident_id: &str,
        filter: &TimeFilter,
    ) -> Result<Vec<AdministrationRecord>, StoreError>;

    /// Vital signs for one resident inside a month window, newest first.
    async fn fetch_vital_signs(
        &self,
        resident_id: &str,
        month_start: &str,
        month_end_exclusive: &str,
    ) -> Result<Vec<VitalSign>, StoreError>;
    async fn create_vital_sign(&self, vital_sign: NewVitalSign)
    -> Result<VitalSign, StoreError>;
    async fn update_vital_sign(
        &self,
        vital_sign_id: &str,
        vital_sign: NewVitalSign,
    ) -> Result<VitalSign, StoreError>;
    async fn delete_vital_sign(&self, vital_sign_id: &str) -> Result<(), StoreError>;

    /// Activities for one resident inside a month window, newest first.
    async fn fetch_activities(
        &self,
        resident_id: &str,
        month_start: &str,
        month_end_exclusive: &str,
    ) -> Result<Vec<Activity>, StoreError>;
    /// One page of a resident's activities, newest first.
    async fn fetch_activity_page(
        &self,
        resident_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Activity>, StoreError>;
    /// Exact row count of a resident's activities.
    async fn fetch_activity_count(&self, resident_id: &str) -> Result<u64, StoreError>;
    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, StoreError>;
    async fn update_activity(
        &self,
        activity_id: &str,
        activity: NewActivity,
    ) -> Result<Activity, StoreError>;
    async fn delete_activity(&self, activity_id: &str) -> Result<(), StoreError>;

    async fn fetch_family_contacts(
        &self,
        resident_id: &str,
    ) -> Result<Vec<FamilyContact>, StoreError>;
    async fn create_family_contact(
        &self,
        contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError>;
    async fn update_family_contact(
        &self,
        contact_id: &str,
        contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError>;
    /// Unset `is_primary` on every contact of the resident. Callers marking a
    /// new primary contact run this first; the two writes are independent and
    /// not atomic.
    async fn clear_primary_contacts(&self, resident_id: &str) -> Result<(), StoreError>;

    /// Validate and upload a resident photo to the blob store; returns the
    /// public URL.
    async fn upload_resident_photo(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError>;
}
