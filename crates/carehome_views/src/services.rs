//! View services: fetch from the store, run the pure calculators, return
//! plain payloads.
//!
//! The store handle is constructor-injected; no ambient global client.

use crate::adherence::{AdherenceStatus, DayWindow, compute_status};
use crate::calendar::{MonthRange, bucket_by_date};
use crate::error::ViewsResult;
use crate::pagination::paginate;
use carehome_store_client::{
    Activity, AdministrationRecord, CareStore, TimeFilter, VitalSign,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Month view for the calendar UI: the raw record list plus the same records
/// bucketed by date.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarView<T> {
    pub records: Vec<T>,
    pub calendar: BTreeMap<String, Vec<T>>,
    pub year: i32,
    pub month: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

#[derive(Clone)]
pub struct ViewService {
    store: Arc<dyn CareStore>,
}

impl ViewService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    /// Per-medication adherence for one resident on one local date.
    pub async fn medication_board(
        &self,
        resident_id: &str,
        date: NaiveDate,
    ) -> ViewsResult<Vec<AdherenceStatus>> {
        let window = DayWindow::for_date(date);
        let medications = self.store.fetch_medications(resident_id).await?;
        let administrations = self
            .store
            .fetch_administrations(
                resident_id,
                &TimeFilter::Day {
                    start: window.start.clone(),
                    end: window.end.clone(),
                },
            )
            .await?;
        tracing::debug!(
            resident_id,
            medications = medications.len(),
            administrations = administrations.len(),
            "building medication board"
        );
        Ok(medications
            .iter()
            .map(|med| compute_status(med, &administrations, &window))
            .collect())
    }

    /// Activities of one month, raw and bucketed by day.
    pub async fn activities_calendar(
        &self,
        resident_id: &str,
        year: i32,
        month: u32,
    ) -> ViewsResult<CalendarView<Activity>> {
        let range = MonthRange::new(year, month)?;
        let records = self
            .store
            .fetch_activities(resident_id, &range.start, &range.end_exclusive)
            .await?;
        build_calendar(records, |r| r.scheduled_at.as_str(), year, month)
    }

    /// Vital signs of one month, raw and bucketed by day.
    pub async fn vitals_calendar(
        &self,
        resident_id: &str,
        year: i32,
        month: u32,
    ) -> ViewsResult<CalendarView<VitalSign>> {
        let range = MonthRange::new(year, month)?;
        let records = self
            .store
            .fetch_vital_signs(resident_id, &range.start, &range.end_exclusive)
            .await?;
        build_calendar(records, |r| r.recorded_at.as_str(), year, month)
    }

    /// Administration history of one month, raw and bucketed by day.
    pub async fn history_calendar(
        &self,
        resident_id: &str,
        year: i32,
        month: u32,
    ) -> ViewsResult<CalendarView<AdministrationRecord>> {
        let range = MonthRange::new(year, month)?;
        let records = self
            .store
            .fetch_administrations(
                resident_id,
                &TimeFilter::Month {
                    start: range.start.clone(),
                    end_exclusive: range.end_exclusive.clone(),
                },
            )
            .await?;
        build_calendar(records, |r| r.administered_at.as_str(), year, month)
    }

    /// One page of a resident's activities with page metadata.
    pub async fn activities_page(
        &self,
        resident_id: &str,
        page: u64,
        limit: u64,
    ) -> ViewsResult<Paged<Activity>> {
        let total_count = self.store.fetch_activity_count(resident_id).await?;
        let info = paginate(total_count, page, limit)?;
        let data = self
            .store
            .fetch_activity_page(resident_id, info.offset, limit)
            .await?;
        Ok(Paged {
            data,
            pagination: PageMeta {
                page,
                limit,
                total_count,
                total_pages: info.total_pages,
                has_next: info.has_next,
                has_prev: info.has_prev,
            },
        })
    }
}

fn build_calendar<T, F>(
    records: Vec<T>,
    timestamp_of: F,
    year: i32,
    month: u32,
) -> ViewsResult<CalendarView<T>>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let calendar = bucket_by_date(records.clone(), timestamp_of)?;
    Ok(CalendarView {
        records,
        calendar,
        year,
        month,
    })
}
