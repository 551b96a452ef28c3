use crate::services::catalog::{BookChanges, BookDraft};
use crate::services::search::criteria::FIRST_PAGE;
use crate::services::search::SearchCriteria;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// A request that is well-formed JSON but carries out-of-range values.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn positive(field: &str, value: Option<i64>) -> Result<Option<i64>, ValidationError> {
    match value {
        Some(v) if v <= 0 => Err(ValidationError(format!("{} must be a positive integer", field))),
        other => Ok(other),
    }
}

fn non_negative(field: &str, value: Option<Decimal>) -> Result<Option<Decimal>, ValidationError> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => {
            Err(ValidationError(format!("{} must not be negative", field)))
        }
        other => Ok(other),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> Result<u32, ValidationError> {
        match self.page {
            Some(0) => Err(ValidationError("page must be a positive integer".to_string())),
            Some(page) => Ok(page),
            None => Ok(FIRST_PAGE),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchFilters {
    pub kind_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub release_year: Option<i64>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub filters: Option<SearchFilters>,
}

impl SearchRequest {
    pub fn into_criteria(self, page: u32) -> Result<SearchCriteria, ValidationError> {
        let filters = self.filters.unwrap_or_default();

        let release_year = positive("release_year", filters.release_year)?
            .map(|year| {
                i32::try_from(year)
                    .map_err(|_| ValidationError("release_year is out of range".to_string()))
            })
            .transpose()?;

        Ok(SearchCriteria {
            query: self.query,
            kind_id: positive("kind_id", filters.kind_id)?,
            genre_id: positive("genre_id", filters.genre_id)?,
            release_year,
            min_price: non_negative("min_price", filters.min_price)?,
            max_price: non_negative("max_price", filters.max_price)?,
            page,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateKindRequest {
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGenreRequest {
    pub genre: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub release_year: i32,
    pub kind_id: i64,
    pub genre_id: i64,
    pub keywords: Vec<String>,
    pub imgs: Vec<String>,
}

impl From<CreateBookRequest> for BookDraft {
    fn from(request: CreateBookRequest) -> Self {
        BookDraft {
            name: request.name,
            author: request.author,
            price: request.price,
            release_year: request.release_year,
            kind_id: request.kind_id,
            genre_id: request.genre_id,
            keywords: request.keywords,
            image_urls: request.imgs,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub release_year: Option<i32>,
    pub kind_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub keywords: Option<Vec<String>>,
}

impl From<UpdateBookRequest> for BookChanges {
    fn from(request: UpdateBookRequest) -> Self {
        BookChanges {
            name: request.name,
            author: request.author,
            price: request.price,
            release_year: request.release_year,
            kind_id: request.kind_id,
            genre_id: request.genre_id,
            keywords: request.keywords,
        }
    }
}
