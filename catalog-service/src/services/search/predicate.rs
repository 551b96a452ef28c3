//! Search predicates over books.
//!
//! A [`Predicate`] is an ordered list of independent [`Criterion`] values that
//! are AND-ed together. The same predicate is evaluated in process by the
//! memory store and translated to a SQL `WHERE` fragment by the PostgreSQL
//! store, so both backends agree on what matches.

use super::criteria::SearchCriteria;
use crate::models::catalog::{Book, TermId};
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

/// One independent filter. `Text` is the only criterion with internal OR
/// semantics (name, author or keyword).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    KindId(TermId),
    GenreId(TermId),
    ReleaseYear(i32),
    MinPrice(Decimal),
    MaxPrice(Decimal),
    /// Holds the already trimmed and case-folded query.
    Text(String),
}

impl Criterion {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Criterion::KindId(id) => book.kind.id == *id,
            Criterion::GenreId(id) => book.genre.id == *id,
            Criterion::ReleaseYear(year) => book.release_year == *year,
            Criterion::MinPrice(min) => book.price >= *min,
            Criterion::MaxPrice(max) => book.price <= *max,
            Criterion::Text(needle) => {
                book.name.to_lowercase().contains(needle.as_str())
                    || book.author.to_lowercase().contains(needle.as_str())
                    || book.keywords.iter().any(|keyword| keyword == needle)
            }
        }
    }

    /// Appends ` AND <clause>` for this criterion. The books table must be
    /// aliased as `b`.
    pub fn push_sql<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        match self {
            Criterion::KindId(id) => {
                builder.push(" AND b.kind_id = ").push_bind(*id);
            }
            Criterion::GenreId(id) => {
                builder.push(" AND b.genre_id = ").push_bind(*id);
            }
            Criterion::ReleaseYear(year) => {
                builder.push(" AND b.release_year = ").push_bind(*year);
            }
            Criterion::MinPrice(min) => {
                builder.push(" AND b.price >= ").push_bind(*min);
            }
            Criterion::MaxPrice(max) => {
                builder.push(" AND b.price <= ").push_bind(*max);
            }
            Criterion::Text(needle) => {
                // strpos keeps the needle literal, no LIKE escaping needed
                builder.push(" AND (strpos(lower(b.name), ");
                builder.push_bind(needle.clone());
                builder.push(") > 0 OR strpos(lower(b.author), ");
                builder.push_bind(needle.clone());
                builder.push(
                    ") > 0 OR EXISTS (SELECT 1 FROM book_keywords k WHERE k.book_id = b.id AND k.keyword = ",
                );
                builder.push_bind(needle.clone());
                builder.push("))");
            }
        }
    }

    /// Lower runs first. Id equality is the cheapest and most selective,
    /// substring search the most expensive.
    fn cost(&self) -> u8 {
        match self {
            Criterion::KindId(_) | Criterion::GenreId(_) => 0,
            Criterion::ReleaseYear(_) => 1,
            Criterion::MinPrice(_) | Criterion::MaxPrice(_) => 2,
            Criterion::Text(_) => 3,
        }
    }
}

/// Conjunction of criteria. Empty means "match every book".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    criteria: Vec<Criterion>,
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Builds the predicate for a set of criteria. Page number is ignored.
    pub fn compose(criteria: &SearchCriteria) -> Self {
        let mut parts = Vec::with_capacity(6);

        if let Some(needle) = criteria.folded_query() {
            parts.push(Criterion::Text(needle));
        }
        if let Some(id) = criteria.kind_id {
            parts.push(Criterion::KindId(id));
        }
        if let Some(id) = criteria.genre_id {
            parts.push(Criterion::GenreId(id));
        }
        if let Some(year) = criteria.release_year {
            parts.push(Criterion::ReleaseYear(year));
        }
        if let Some(min) = criteria.min_price {
            parts.push(Criterion::MinPrice(min));
        }
        if let Some(max) = criteria.max_price {
            parts.push(Criterion::MaxPrice(max));
        }

        // stable sort: equal-cost criteria keep insertion order
        parts.sort_by_key(Criterion::cost);

        Self { criteria: parts }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_match_all(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(book))
    }

    /// Appends ` WHERE TRUE AND ...` for the whole conjunction.
    pub fn push_where<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        builder.push(" WHERE TRUE");
        for criterion in &self.criteria {
            criterion.push_sql(builder);
        }
    }
}
