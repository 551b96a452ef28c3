use crate::models::catalog::TermId;
use crate::utils::text::fold_query;
use rust_decimal::Decimal;

pub const FIRST_PAGE: u32 = 1;

/// Already-validated search parameters for one request.
///
/// Every filter is an explicit `Option` so that an absent filter and a
/// present-but-zero filter never collapse into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub query: Option<String>,
    pub kind_id: Option<TermId>,
    pub genre_id: Option<TermId>,
    pub release_year: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: None,
            kind_id: None,
            genre_id: None,
            release_year: None,
            min_price: None,
            max_price: None,
            page: FIRST_PAGE,
        }
    }
}

impl SearchCriteria {
    /// Browse-all criteria for the given page.
    pub fn browse(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_kind(mut self, kind_id: TermId) -> Self {
        self.kind_id = Some(kind_id);
        self
    }

    pub fn with_genre(mut self, genre_id: TermId) -> Self {
        self.genre_id = Some(genre_id);
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// The query as it is matched: trimmed and case-folded.
    pub fn folded_query(&self) -> Option<String> {
        self.query.as_deref().and_then(fold_query)
    }

    pub fn is_browse(&self) -> bool {
        self.folded_query().is_none()
            && self.kind_id.is_none()
            && self.genre_id.is_none()
            && self.release_year.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_browse_on_first_page() {
        let criteria = SearchCriteria::default();
        assert!(criteria.is_browse());
        assert_eq!(criteria.page, FIRST_PAGE);
    }

    #[test]
    fn zero_year_is_a_filter() {
        let criteria = SearchCriteria::default().with_release_year(0);
        assert!(!criteria.is_browse());
    }

    #[test]
    fn blank_query_is_ignored() {
        let criteria = SearchCriteria::default().with_query("   ");
        assert_eq!(criteria.folded_query(), None);
        assert!(criteria.is_browse());
    }
}
