/// Page envelope metadata computed from the requested window and the
/// total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

/// `size` must be positive; callers normalise query parameters before
/// reaching this point.
pub fn page_meta(page: i64, size: i64, total_elements: i64) -> PageMeta {
    let total_pages = if total_elements == 0 {
        0
    } else {
        (total_elements + size - 1) / size
    };
    PageMeta {
        page,
        size,
        total_elements,
        total_pages,
        first: page == 0,
        last: page >= total_pages - 1,
    }
}
