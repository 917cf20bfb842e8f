//! Derived views over care-facility records.
//!
//! Three pure calculators — medication adherence, calendar bucketing and
//! pagination — plus async services that compose them with a
//! [`CareStore`](carehome_store_client::CareStore) fetch. All inputs and
//! outputs are plain data; nothing here touches the network directly.

pub mod adherence;
pub mod calendar;
pub mod error;
pub mod pagination;
pub mod services;
mod test_utils;

pub use adherence::{AdherenceStatus, DayWindow, compute_status, expected_daily_doses};
pub use calendar::{MonthRange, bucket_by_date};
pub use error::{ViewsError, ViewsResult};
pub use pagination::{PageInfo, paginate};
pub use services::{CalendarView, Paged, PageMeta, ViewService};
