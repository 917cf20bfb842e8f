//! Shared stub `CareStore` used by the service unit tests.
#![cfg(test)]

use async_trait::async_trait;
use carehome_store_client::{
    Activity, AdministrationRecord, CareStore, FamilyContact, Medication, NewActivity,
    NewAdministrationRecord, NewFamilyContact, NewMedication, NewResident, NewVitalSign, Resident,
    StoreError, TimeFilter, VitalSign,
};

/// In-memory store with a small March-2024 fixture set, or a variant where
/// every call fails with a 500.
pub struct StubStore {
    fail: bool,
}

impl StubStore {
    pub fn with_fixtures() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(StoreError::from_status(500, "stub failure".into()))
        } else {
            Ok(())
        }
    }

    fn medications() -> Vec<Medication> {
        vec![
            Medication {
                id: "m1".into(),
                resident_id: "r1".into(),
                med_name: "Paracetamol".into(),
                dosage: "500mg".into(),
                frequency: "dos veces al día".into(),
                scheduled_time: Some("08:00:00".into()),
                notes: None,
            },
            Medication {
                id: "m2".into(),
                resident_id: "r1".into(),
                med_name: "Ibuprofeno".into(),
                dosage: "400mg".into(),
                frequency: "cada 8 horas".into(),
                scheduled_time: None,
                notes: None,
            },
        ]
    }

    fn administrations() -> Vec<AdministrationRecord> {
        ["2024-03-05T08:00:00", "2024-03-05T20:00:00"]
            .iter()
            .map(|at| AdministrationRecord {
                id: format!("h-{at}"),
                medication_id: "m1".into(),
                resident_id: "r1".into(),
                administered_at: (*at).into(),
                administered_by_user_id: "staff7".into(),
                med_name: "Paracetamol".into(),
                dosage: "500mg".into(),
                notes: None,
            })
            .collect()
    }

    fn activities() -> Vec<Activity> {
        [
            ("a1", "2024-03-06T09:00:00"),
            ("a2", "2024-03-05T16:00:00"),
            ("a3", "2024-03-05T10:00:00"),
        ]
        .iter()
        .map(|(id, at)| Activity {
            id: (*id).into(),
            resident_id: "r1".into(),
            activity_type: "Recreativas".into(),
            title: "Bingo".into(),
            description: None,
            scheduled_at: (*at).into(),
            completed_at: None,
            status: "scheduled".into(),
            notes: None,
            registered_by: None,
        })
        .collect()
    }

    fn vital_signs() -> Vec<VitalSign> {
        vec![VitalSign {
            id: "v1".into(),
            resident_id: "r1".into(),
            recorded_at: "2024-03-05T07:30:00".into(),
            blood_pressure: Some("120/80".into()),
            temperature: Some(36.6),
            pulse: Some(72),
            recorded_by_user_id: Some("staff7".into()),
            notes: None,
        }]
    }
}

#[async_trait]
impl CareStore for StubStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.guard()
    }

    async fn fetch_residents(&self) -> Result<Vec<Resident>, StoreError> {
        unimplemented!()
    }

    async fn fetch_resident(&self, _resident_id: &str) -> Result<Resident, StoreError> {
        unimplemented!()
    }

    async fn create_resident(&self, _resident: NewResident) -> Result<Resident, StoreError> {
        unimplemented!()
    }

    async fn update_resident(
        &self,
        _resident_id: &str,
        _resident: NewResident,
    ) -> Result<Resident, StoreError> {
        unimplemented!()
    }

    async fn delete_resident(&self, _resident_id: &str) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn fetch_medications(&self, _resident_id: &str) -> Result<Vec<Medication>, StoreError> {
        self.guard()?;
        Ok(Self::medications())
    }

    async fn create_medication(
        &self,
        _medication: NewMedication,
    ) -> Result<Medication, StoreError> {
        unimplemented!()
    }

    async fn update_medication(
        &self,
        _medication_id: &str,
        _medication: NewMedication,
    ) -> Result<Medication, StoreError> {
        unimplemented!()
    }

    async fn delete_medication(&self, _medication_id: &str) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn record_administration(
        &self,
        _entry: NewAdministrationRecord,
    ) -> Result<AdministrationRecord, StoreError> {
        unimplemented!()
    }

    async fn fetch_administrations(
        &self,
        _resident_id: &str,
        filter: &TimeFilter,
    ) -> Result<Vec<AdministrationRecord>, StoreError> {
        self.guard()?;
        let records = Self::administrations();
        Ok(match filter {
            TimeFilter::Day { start, end } => records
                .into_iter()
                .filter(|r| start.as_str() <= r.administered_at.as_str()
                    && r.administered_at.as_str() <= end.as_str())
                .collect(),
            TimeFilter::Month {
                start,
                end_exclusive,
            } => records
                .into_iter()
                .filter(|r| start.as_str() <= r.administered_at.as_str()
                    && r.administered_at.as_str() < end_exclusive.as_str())
                .collect(),
        })
    }

    async fn fetch_vital_signs(
        &self,
        _resident_id: &str,
        _month_start: &str,
        _month_end_exclusive: &str,
    ) -> Result<Vec<VitalSign>, StoreError> {
        self.guard()?;
        Ok(Self::vital_signs())
    }

    async fn create_vital_sign(&self, _vital_sign: NewVitalSign) -> Result<VitalSign, StoreError> {
        unimplemented!()
    }

    async fn update_vital_sign(
        &self,
        _vital_sign_id: &str,
        _vital_sign: NewVitalSign,
    ) -> Result<VitalSign, StoreError> {
        unimplemented!()
    }

    async fn delete_vital_sign(&self, _vital_sign_id: &str) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn fetch_activities(
        &self,
        _resident_id: &str,
        _month_start: &str,
        _month_end_exclusive: &str,
    ) -> Result<Vec<Activity>, StoreError> {
        self.guard()?;
        Ok(Self::activities())
    }

    async fn fetch_activity_page(
        &self,
        _resident_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Activity>, StoreError> {
        self.guard()?;
        Ok(Self::activities()
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn fetch_activity_count(&self, _resident_id: &str) -> Result<u64, StoreError> {
        self.guard()?;
        Ok(Self::activities().len() as u64)
    }

    async fn create_activity(&self, _activity: NewActivity) -> Result<Activity, StoreError> {
        unimplemented!()
    }

    async fn update_activity(
        &self,
        _activity_id: &str,
        _activity: NewActivity,
    ) -> Result<Activity, StoreError> {
        unimplemented!()
    }

    async fn delete_activity(&self, _activity_id: &str) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn fetch_family_contacts(
        &self,
        _resident_id: &str,
    ) -> Result<Vec<FamilyContact>, StoreError> {
        unimplemented!()
    }

    async fn create_family_contact(
        &self,
        _contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError> {
        unimplemented!()
    }

    async fn update_family_contact(
        &self,
        _contact_id: &str,
        _contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError> {
        unimplemented!()
    }

    async fn clear_primary_contacts(&self, _resident_id: &str) -> Result<(), StoreError> {
        unimplemented!()
    }

    async fn upload_resident_photo(
        &self,
        _filename: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        unimplemented!()
    }
}
