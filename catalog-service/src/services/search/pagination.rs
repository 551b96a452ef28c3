use serde::Serialize;

/// Fixed page size; not configurable per request.
pub const PER_PAGE: usize = 20;

/// Where a page sits within a result set of known size.
///
/// Built before anything is fetched so that an out-of-range page fails
/// without touching the store a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// `page` is zero, or beyond the last page of a non-empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutOfRange(pub u32);

impl PageWindow {
    pub fn new(total_items: usize, page: u32) -> Result<Self, PageOutOfRange> {
        Self::with_page_size(total_items, page, PER_PAGE)
    }

    pub fn with_page_size(
        total_items: usize,
        page: u32,
        per_page: usize,
    ) -> Result<Self, PageOutOfRange> {
        let total_pages = total_items.div_ceil(per_page);

        // an empty result has no pages, any page number just yields nothing
        if page == 0 || (total_pages > 0 && page as usize > total_pages) {
            return Err(PageOutOfRange(page));
        }

        Ok(Self {
            page,
            per_page,
            total_items,
            total_pages,
        })
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page
    }

    /// No rows can fall inside this window.
    pub fn is_empty(&self) -> bool {
        self.total_pages == 0
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as usize) < self.total_pages
    }

    pub fn prev_page(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }
}

/// One page of results plus the window it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}

impl<T> ResultPage<T> {
    pub fn empty(window: PageWindow) -> Self {
        Self {
            items: Vec::new(),
            window,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultPage<U> {
        ResultPage {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
