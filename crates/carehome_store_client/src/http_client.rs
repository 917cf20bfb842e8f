//! HTTP implementation of [`CareStore`](crate::CareStore) for the hosted store.
//!
//! Every table lives under `{base}/rest/v1/{table}` and is queried with the
//! store's filter dialect: `column=eq.V`, `column=gte.V`, `column=lte.V`,
//! `column=lt.V`, `order=column.desc`, `offset`/`limit`. Writes ask for
//! `return=representation` so the affected rows come back in the response;
//! an empty representation on update or delete means the row did not exist.

use crate::{
    Activity, AdministrationRecord, CareStore, FamilyContact, Medication, NewActivity,
    NewAdministrationRecord, NewFamilyContact, NewMedication, NewResident, NewVitalSign, Resident,
    StoreError, TimeFilter, VitalSign, storage,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Client for the hosted care-facility store using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestCareStore {
    base_url: String,
    service_key: SecretString,
    photo_bucket: String,
    client: reqwest::Client,
}

impl ReqwestCareStore {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The project base URL, e.g. "https://abc.example.co"
    /// * `service_key` - The service key used for both auth headers
    /// * `photo_bucket` - Blob-store bucket holding resident photos
    pub fn new(base_url: &str, service_key: SecretString, photo_bucket: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            photo_bucket: photo_bucket.into(),
            client,
        }
    }

    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self::new(
            &cfg.base_url,
            cfg.service_key.clone(),
            cfg.photo_bucket.clone(),
        )
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach the store's auth headers to a request.
    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
    }

    fn get_table(&self, table: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.get(self.table_url(table)))
            .query(&[("select", "*")])
    }

    fn insert_into(&self, table: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
    }

    fn patch_table(&self, table: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=representation")
    }

    fn delete_from(&self, table: &str) -> reqwest::RequestBuilder {
        self.authed(self.client.delete(self.table_url(table)))
            .header("Prefer", "return=representation")
    }

    /// Execute a request and decode the row set.
    async fn execute_rows<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, StoreError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(resp.json::<Vec<T>>().await?)
    }

    /// Execute a request expected to affect exactly one row; an empty
    /// representation maps to `NotFound`.
    async fn execute_one<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, StoreError> {
        let mut rows: Vec<T> = self.execute_rows(request).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(what.to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    /// Exact row count for a filtered table, from the `Content-Range` header.
    async fn count_rows(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<u64, StoreError> {
        let pairs: Vec<(&str, &str)> = std::iter::once(("select", "id"))
            .chain(filters.iter().map(|(k, v)| (*k, v.as_str())))
            .chain(std::iter::once(("limit", "1")))
            .collect();
        let resp = self
            .authed(self.client.get(self.table_url(table)))
            .header("Prefer", "count=exact")
            .query(&pairs)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        let total = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.rsplit('/').next())
            .and_then(|s| s.parse::<u64>().ok());
        total.ok_or_else(|| StoreError::Config("missing or malformed Content-Range header".into()))
    }
}

/// Extract error information from a failed response.
async fn error_from_response(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let body_snippet: String = body.chars().take(256).collect();

    match status {
        404 => StoreError::NotFound(body_snippet),
        401 | 403 => StoreError::Auth(body_snippet),
        400 | 422 => StoreError::InvalidInput(body_snippet),
        _ => StoreError::from_status(status, body_snippet),
    }
}

fn eq(column: &'static str, value: &str) -> (&'static str, String) {
    (column, format!("eq.{value}"))
}

#[async_trait]
impl CareStore for ReqwestCareStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.get(format!("{}/rest/v1/", self.base_url)))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }

    async fn fetch_residents(&self) -> Result<Vec<Resident>, StoreError> {
        self.execute_rows(self.get_table("residents")).await
    }

    async fn fetch_resident(&self, resident_id: &str) -> Result<Resident, StoreError> {
        let req = self.get_table("residents").query(&[eq("id", resident_id)]);
        self.execute_one(req, "resident").await
    }

    async fn create_resident(&self, resident: NewResident) -> Result<Resident, StoreError> {
        tracing::debug!(name = %resident.name, "creating resident");
        let req = self.insert_into("residents").json(&resident);
        self.execute_one(req, "resident").await
    }

    async fn update_resident(
        &self,
        resident_id: &str,
        resident: NewResident,
    ) -> Result<Resident, StoreError> {
        tracing::debug!(resident_id, "updating resident");
        let req = self
            .patch_table("residents")
            .query(&[eq("id", resident_id)])
            .json(&resident);
        self.execute_one(req, "resident").await
    }

    async fn delete_resident(&self, resident_id: &str) -> Result<(), StoreError> {
        let req = self.delete_from("residents").query(&[eq("id", resident_id)]);
        let rows: Vec<Resident> = self.execute_rows(req).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound("resident".into()));
        }
        Ok(())
    }

    async fn fetch_medications(&self, resident_id: &str) -> Result<Vec<Medication>, StoreError> {
        let req = self
            .get_table("medications")
            .query(&[eq("resident_id", resident_id)]);
        self.execute_rows(req).await
    }

    async fn create_medication(
        &self,
        medication: NewMedication,
    ) -> Result<Medication, StoreError> {
        tracing::debug!(resident_id = %medication.resident_id, med_name = %medication.med_name, "creating medication");
        let req = self.insert_into("medications").json(&medication);
        self.execute_one(req, "medication").await
    }

    async fn update_medication(
        &self,
        medication_id: &str,
        medication: NewMedication,
    ) -> Result<Medication, StoreError> {
        tracing::debug!(medication_id, "updating medication");
        let req = self
            .patch_table("medications")
            .query(&[eq("id", medication_id)])
            .json(&medication);
        self.execute_one(req, "medication").await
    }

    async fn delete_medication(&self, medication_id: &str) -> Result<(), StoreError> {
        let req = self
            .delete_from("medications")
            .query(&[eq("id", medication_id)]);
        let rows: Vec<Medication> = self.execute_rows(req).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound("medication".into()));
        }
        Ok(())
    }

    async fn record_administration(
        &self,
        entry: NewAdministrationRecord,
    ) -> Result<AdministrationRecord, StoreError> {
        tracing::info!(
            medication_id = %entry.medication_id,
            administered_by = %entry.administered_by_user_id,
            "recording administration"
        );
        let req = self.insert_into("medication_history").json(&entry);
        self.execute_one(req, "administration record").await
    }

    async fn fetch_administrations(
        &self,
        resident_id: &str,
        filter: &TimeFilter,
    ) -> Result<Vec<AdministrationRecord>, StoreError> {
        let mut pairs: Vec<(&str, String)> = vec![eq("resident_id", resident_id)];
        match filter {
            TimeFilter::Day { start, end } => {
                pairs.push(("administered_at", format!("gte.{start}")));
                pairs.push(("administered_at", format!("lte.{end}")));
            }
            TimeFilter::Month {
                start,
                end_exclusive,
            } => {
                pairs.push(("administered_at", format!("gte.{start}")));
                pairs.push(("administered_at", format!("lt.{end_exclusive}")));
            }
        }
        pairs.push(("order", "administered_at.desc".into()));
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute_rows(self.get_table("medication_history").query(&qp))
            .await
    }

    async fn fetch_vital_signs(
        &self,
        resident_id: &str,
        month_start: &str,
        month_end_exclusive: &str,
    ) -> Result<Vec<VitalSign>, StoreError> {
        let pairs: Vec<(&str, String)> = vec![
            eq("resident_id", resident_id),
            ("recorded_at", format!("gte.{month_start}")),
            ("recorded_at", format!("lt.{month_end_exclusive}")),
            ("order", "recorded_at.desc".into()),
        ];
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute_rows(self.get_table("vital_signs").query(&qp))
            .await
    }

    async fn create_vital_sign(&self, vital_sign: NewVitalSign) -> Result<VitalSign, StoreError> {
        tracing::debug!(resident_id = %vital_sign.resident_id, "creating vital sign");
        let req = self.insert_into("vital_signs").json(&vital_sign);
        self.execute_one(req, "vital sign").await
    }

    async fn update_vital_sign(
        &self,
        vital_sign_id: &str,
        vital_sign: NewVitalSign,
    ) -> Result<VitalSign, StoreError> {
        tracing::debug!(vital_sign_id, "updating vital sign");
        let req = self
            .patch_table("vital_signs")
            .query(&[eq("id", vital_sign_id)])
            .json(&vital_sign);
        self.execute_one(req, "vital sign").await
    }

    async fn delete_vital_sign(&self, vital_sign_id: &str) -> Result<(), StoreError> {
        let req = self
            .delete_from("vital_signs")
            .query(&[eq("id", vital_sign_id)]);
        let rows: Vec<VitalSign> = self.execute_rows(req).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound("vital sign".into()));
        }
        Ok(())
    }

    async fn fetch_activities(
        &self,
        resident_id: &str,
        month_start: &str,
        month_end_exclusive: &str,
    ) -> Result<Vec<Activity>, StoreError> {
        let pairs: Vec<(&str, String)> = vec![
            eq("resident_id", resident_id),
            ("scheduled_at", format!("gte.{month_start}")),
            ("scheduled_at", format!("lt.{month_end_exclusive}")),
            ("order", "scheduled_at.desc".into()),
        ];
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute_rows(self.get_table("activities").query(&qp))
            .await
    }

    async fn fetch_activity_page(
        &self,
        resident_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Activity>, StoreError> {
        let pairs: Vec<(&str, String)> = vec![
            eq("resident_id", resident_id),
            ("order", "scheduled_at.desc".into()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.execute_rows(self.get_table("activities").query(&qp))
            .await
    }

    async fn fetch_activity_count(&self, resident_id: &str) -> Result<u64, StoreError> {
        self.count_rows("activities", &[eq("resident_id", resident_id)])
            .await
    }

    async fn create_activity(&self, activity: NewActivity) -> Result<Activity, StoreError> {
        tracing::debug!(resident_id = %activity.resident_id, title = %activity.title, "creating activity");
        let req = self.insert_into("activities").json(&activity);
        self.execute_one(req, "activity").await
    }

    async fn update_activity(
        &self,
        activity_id: &str,
        activity: NewActivity,
    ) -> Result<Activity, StoreError> {
        tracing::debug!(activity_id, "updating activity");
        let req = self
            .patch_table("activities")
            .query(&[eq("id", activity_id)])
            .json(&activity);
        self.execute_one(req, "activity").await
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<(), StoreError> {
        let req = self
            .delete_from("activities")
            .query(&[eq("id", activity_id)]);
        let rows: Vec<Activity> = self.execute_rows(req).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound("activity".into()));
        }
        Ok(())
    }

    async fn fetch_family_contacts(
        &self,
        resident_id: &str,
    ) -> Result<Vec<FamilyContact>, StoreError> {
        let req = self
            .get_table("family_contacts")
            .query(&[eq("resident_id", resident_id)]);
        self.execute_rows(req).await
    }

    async fn create_family_contact(
        &self,
        contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError> {
        if contact.is_primary {
            self.clear_primary_contacts(&contact.resident_id).await?;
        }
        let req = self.insert_into("family_contacts").json(&contact);
        self.execute_one(req, "family contact").await
    }

    async fn update_family_contact(
        &self,
        contact_id: &str,
        contact: NewFamilyContact,
    ) -> Result<FamilyContact, StoreError> {
        if contact.is_primary {
            self.clear_primary_contacts(&contact.resident_id).await?;
        }
        let req = self
            .patch_table("family_contacts")
            .query(&[eq("id", contact_id)])
            .json(&contact);
        self.execute_one(req, "family contact").await
    }

    async fn clear_primary_contacts(&self, resident_id: &str) -> Result<(), StoreError> {
        tracing::debug!(resident_id, "clearing primary contacts");
        let resp = self
            .patch_table("family_contacts")
            .query(&[eq("resident_id", resident_id)])
            .json(&serde_json::json!({ "is_primary": false }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        // Residents without contacts yield an empty representation; that is
        // not an error here.
        Ok(())
    }

    async fn upload_resident_photo(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let ext = storage::validate_photo(filename, &bytes)?;
        let object_name = storage::unique_photo_name(ext);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.photo_bucket, object_name
        );
        tracing::info!(object = %object_name, size = bytes.len(), "uploading resident photo");
        let resp = self
            .authed(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.photo_bucket, object_name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::ReqwestCareStore;
    use secrecy::SecretString;

    #[test]
    fn new_trims_trailing_slash() {
        let store =
            ReqwestCareStore::new("http://localhost/", SecretString::new("key".into()), "residents");
        assert_eq!(store.table_url("medications"), "http://localhost/rest/v1/medications");
    }
}
