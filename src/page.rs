use serde::{Deserialize, Serialize};

/// Page arithmetic resolved from a record count and the requested page.
///
/// Everything here is derived once per call; nothing is persisted
/// between invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) current_page: u64,
    pub(crate) total_pages: u64,

    /// The position from which to start retrieving records.
    /// Equivalent to 'skip' in MongoDB, 'offset' in Postgres.
    pub(crate) skip: u64,
    pub(crate) limit: u64,
    pub(crate) previous_pages: Vec<u64>,
    pub(crate) next_pages: Vec<u64>,
}

impl PageWindow {
    /// Resolves the window for a given record count.
    ///
    /// `limit` and `page_number` are coerced to at least 1 before use.
    /// The requested page is clamped into `[1, total_pages]`; when the
    /// collection is empty (`total_pages == 0`) the current page is
    /// pinned to 1 so the page bounds invariant holds either way.
    pub(crate) fn resolve(total_items: u64, limit: u64, page_number: u64, page_range: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total_items.div_ceil(limit);

        let mut current_page = page_number.max(1);
        if current_page > total_pages {
            current_page = total_pages.max(1);
        }

        let skip = (current_page - 1) * limit;

        let previous_pages: Vec<u64> = (1..=page_range)
            .rev()
            .filter_map(|i| current_page.checked_sub(i))
            .filter(|page| *page >= 1)
            .collect();

        let next_pages: Vec<u64> = (1..=page_range)
            .map(|i| current_page + i)
            .filter(|page| *page <= total_pages)
            .collect();

        Self {
            current_page,
            total_pages,
            skip,
            limit,
            previous_pages,
            next_pages,
        }
    }
}

/// Pagination summary returned alongside a page of items.
///
/// Field names serialize in camelCase so the JSON shape matches what API
/// consumers typically expect from pagination envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Number of items actually returned on this page.
    pub items_count: usize,
    pub current_page: u64,
    pub total_pages: u64,
    /// Neighboring page numbers before the current page, ascending.
    pub previous_pages: Vec<u64>,
    /// Neighboring page numbers after the current page, ascending.
    pub next_pages: Vec<u64>,
}

/// A fetched page of records plus its pagination summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
