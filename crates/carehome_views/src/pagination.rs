//! Offset/limit pagination arithmetic.

use crate::error::{ViewsError, ViewsResult};
use serde::Serialize;

/// Derived page metadata for a 1-based page over `total_count` rows.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub offset: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Pure page arithmetic. Fails fast on `page == 0` or `limit == 0` rather
/// than clamping.
///
/// `total_count == 0` yields `total_pages == 0` and therefore `has_next ==
/// false` for every page; this degenerate case is intentional and not
/// special-cased to one page.
pub fn paginate(total_count: u64, page: u64, limit: u64) -> ViewsResult<PageInfo> {
    if limit == 0 {
        return Err(ViewsError::InvalidLimit(limit));
    }
    if page == 0 {
        return Err(ViewsError::InvalidPage(page));
    }
    let offset = (page - 1) * limit;
    let total_pages = (total_count + limit - 1) / limit;
    Ok(PageInfo {
        offset,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    })
}
