//! Catalog maintenance: the write paths that keep the invariants search
//! relies on (every book has exactly one existing kind and genre, at least
//! one keyword and one image; terms cannot be deleted while referenced).

use crate::models::catalog::{Book, BookId, BookPatch, Entity, NewBook, Taxonomy, Term, TermId};
use crate::models::storage::{CatalogStore, StorageError};
use crate::utils::text::{normalize_keywords, normalize_label};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const PRICE_SCALE: u32 = 2;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(message) => CatalogError::Conflict(message),
            other => CatalogError::Storage(other),
        }
    }
}

/// Book fields as supplied by a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub name: String,
    pub author: String,
    pub price: Decimal,
    pub release_year: i32,
    pub kind_id: TermId,
    pub genre_id: TermId,
    pub keywords: Vec<String>,
    pub image_urls: Vec<String>,
}

/// Optional book fields as supplied by a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub release_year: Option<i32>,
    pub kind_id: Option<TermId>,
    pub genre_id: Option<TermId>,
    pub keywords: Option<Vec<String>>,
}

fn required_text(field: &str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn valid_price(price: Decimal) -> Result<Decimal, CatalogError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CatalogError::Validation("price must not be negative".to_string()));
    }
    Ok(price.round_dp(PRICE_SCALE))
}

fn valid_year(year: i32) -> Result<i32, CatalogError> {
    if year <= 0 {
        return Err(CatalogError::Validation("release_year must be positive".to_string()));
    }
    Ok(year)
}

fn valid_keywords(keywords: &[String]) -> Result<Vec<String>, CatalogError> {
    let keywords = normalize_keywords(keywords);
    if keywords.is_empty() {
        return Err(CatalogError::Validation("at least one keyword is required".to_string()));
    }
    Ok(keywords)
}

fn valid_image_urls(urls: &[String]) -> Result<Vec<String>, CatalogError> {
    let urls: Vec<String> = urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        return Err(CatalogError::Validation("at least one image is required".to_string()));
    }
    Ok(urls)
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore + Send + Sync>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore + Send + Sync>) -> Self {
        Self { store }
    }

    async fn require_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Term, CatalogError> {
        self.store
            .get_term(taxonomy, id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: taxonomy.into(),
                id,
            })
    }

    pub async fn create_term(&self, taxonomy: Taxonomy, label: &str) -> Result<Term, CatalogError> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(CatalogError::Validation(format!("{} must not be empty", taxonomy)));
        }

        let term = self.store.create_term(taxonomy, &label).await?;
        info!("Created {} {} '{}'", taxonomy, term.id, term.label);
        Ok(term)
    }

    pub async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, CatalogError> {
        Ok(self.store.list_terms(taxonomy).await?)
    }

    pub async fn get_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Term, CatalogError> {
        self.require_term(taxonomy, id).await
    }

    pub async fn delete_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<(), CatalogError> {
        if !self.store.delete_term(taxonomy, id).await? {
            return Err(CatalogError::NotFound {
                entity: taxonomy.into(),
                id,
            });
        }
        info!("Deleted {} {}", taxonomy, id);
        Ok(())
    }

    pub async fn create_book(&self, draft: BookDraft) -> Result<Book, CatalogError> {
        let book = NewBook {
            name: required_text("name", &draft.name)?,
            author: required_text("author", &draft.author)?,
            price: valid_price(draft.price)?,
            release_year: valid_year(draft.release_year)?,
            kind_id: draft.kind_id,
            genre_id: draft.genre_id,
            keywords: valid_keywords(&draft.keywords)?,
            image_urls: valid_image_urls(&draft.image_urls)?,
        };

        self.require_term(Taxonomy::Kind, book.kind_id).await?;
        self.require_term(Taxonomy::Genre, book.genre_id).await?;

        let stored = self.store.create_book(&book).await?;
        info!("Created book {} '{}'", stored.id, stored.name);
        Ok(stored)
    }

    pub async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        self.store
            .get_book(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: Entity::Book,
                id,
            })
    }

    pub async fn update_book(&self, id: BookId, changes: BookChanges) -> Result<Book, CatalogError> {
        let patch = BookPatch {
            name: changes.name.as_deref().map(|v| required_text("name", v)).transpose()?,
            author: changes.author.as_deref().map(|v| required_text("author", v)).transpose()?,
            price: changes.price.map(valid_price).transpose()?,
            release_year: changes.release_year.map(valid_year).transpose()?,
            kind_id: changes.kind_id,
            genre_id: changes.genre_id,
            keywords: changes.keywords.as_deref().map(valid_keywords).transpose()?,
        };

        if let Some(kind_id) = patch.kind_id {
            self.require_term(Taxonomy::Kind, kind_id).await?;
        }
        if let Some(genre_id) = patch.genre_id {
            self.require_term(Taxonomy::Genre, genre_id).await?;
        }
        if patch.is_empty() {
            return self.get_book(id).await;
        }

        let updated = self
            .store
            .update_book(id, &patch)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: Entity::Book,
                id,
            })?;
        info!("Updated book {}", id);
        Ok(updated)
    }

    pub async fn delete_book(&self, id: BookId) -> Result<(), CatalogError> {
        if !self.store.delete_book(id).await? {
            return Err(CatalogError::NotFound {
                entity: Entity::Book,
                id,
            });
        }
        info!("Deleted book {}", id);
        Ok(())
    }
}
