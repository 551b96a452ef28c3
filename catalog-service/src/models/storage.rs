use crate::models::catalog::{Book, BookId, BookPatch, NewBook, Taxonomy, Term, TermId};
use crate::services::search::predicate::Predicate;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Connection error: {0}")]
    Connection(String),
}

/// A consistent, read-only view of the catalog for the duration of one
/// search. Count and page fetch issued on the same snapshot always agree.
#[async_trait]
pub trait CatalogSnapshot: Send {
    async fn term_exists(&mut self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError>;
    async fn count_books(&mut self, predicate: &Predicate) -> Result<usize, StorageError>;
    /// Matching books ordered by ascending id.
    async fn fetch_books(
        &mut self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Book>, StorageError>;
}

#[async_trait]
pub trait CatalogStore {
    async fn snapshot(&self) -> Result<Box<dyn CatalogSnapshot>, StorageError>;

    /// `Conflict` when the label is already taken.
    async fn create_term(&self, taxonomy: Taxonomy, label: &str) -> Result<Term, StorageError>;
    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StorageError>;
    async fn get_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Option<Term>, StorageError>;
    /// `Ok(false)` when missing, `Conflict` while any book references it.
    async fn delete_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError>;

    /// Kind and genre are expected to exist; a dangling reference is a `Conflict`.
    async fn create_book(&self, book: &NewBook) -> Result<Book, StorageError>;
    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError>;
    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Option<Book>, StorageError>;
    async fn delete_book(&self, id: BookId) -> Result<bool, StorageError>;

    async fn book_count(&self) -> Result<usize, StorageError>;
    async fn test_connection(&self) -> Result<(), StorageError>;
}
