//! Page-number window for the pagination control.

use std::fmt;

/// Pages on either side of the current one that are always shown.
const WINDOW: u32 = 2;

/// One slot in the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    /// Skipped pages.
    Ellipsis,
}

impl fmt::Display for PageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{n}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// First page, last page and `current ± 2`, with ellipses over the gaps.
///
/// Empty when there is at most one page, in which case the control is hidden.
#[must_use]
pub fn visible_pages(current: u32, total: u32) -> Vec<PageMarker> {
    if total <= 1 {
        return Vec::new();
    }

    let mut markers = vec![PageMarker::Page(1)];
    if current.saturating_sub(WINDOW) > 2 {
        markers.push(PageMarker::Ellipsis);
    }

    let low = current.saturating_sub(WINDOW).max(2);
    let high = current.saturating_add(WINDOW).min(total - 1);
    markers.extend((low..=high).map(PageMarker::Page));

    if current.saturating_add(WINDOW) < total - 1 {
        markers.push(PageMarker::Ellipsis);
    }
    markers.push(PageMarker::Page(total));
    markers
}

/// 1-based inclusive range of items shown on `page`, plus the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl RangeSummary {
    /// Summary for `page` of `total` items at `per_page` each, or `None` when
    /// the page shows nothing.
    #[must_use]
    pub fn new(page: u32, per_page: u32, total: usize) -> Option<Self> {
        let per_page = per_page as usize;
        let start = (page as usize).checked_sub(1)?.saturating_mul(per_page);
        if per_page == 0 || start >= total {
            return None;
        }
        Some(Self {
            start: start + 1,
            end: start.saturating_add(per_page).min(total),
            total,
        })
    }
}

impl fmt::Display for RangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "showing {}-{} of {}", self.start, self.end, self.total)
    }
}
