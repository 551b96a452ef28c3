use crate::models::catalog::{Book, BookId, BookPatch, Image, NewBook, Taxonomy, Term, TermId};
use crate::models::storage::{CatalogSnapshot, CatalogStore, StorageError};
use crate::services::search::predicate::Predicate;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    kinds: BTreeMap<TermId, Term>,
    genres: BTreeMap<TermId, Term>,
    books: BTreeMap<BookId, Book>,
    last_kind_id: TermId,
    last_genre_id: TermId,
    last_book_id: BookId,
    last_image_id: i64,
}

impl CatalogState {
    fn terms(&self, taxonomy: Taxonomy) -> &BTreeMap<TermId, Term> {
        match taxonomy {
            Taxonomy::Kind => &self.kinds,
            Taxonomy::Genre => &self.genres,
        }
    }

    fn terms_mut(&mut self, taxonomy: Taxonomy) -> &mut BTreeMap<TermId, Term> {
        match taxonomy {
            Taxonomy::Kind => &mut self.kinds,
            Taxonomy::Genre => &mut self.genres,
        }
    }

    fn next_term_id(&mut self, taxonomy: Taxonomy) -> TermId {
        let last = match taxonomy {
            Taxonomy::Kind => &mut self.last_kind_id,
            Taxonomy::Genre => &mut self.last_genre_id,
        };
        *last += 1;
        *last
    }

    fn term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Term, StorageError> {
        self.terms(taxonomy).get(&id).cloned().ok_or_else(|| {
            StorageError::Conflict(format!("{} {} does not exist", taxonomy, id))
        })
    }

    fn is_referenced(&self, taxonomy: Taxonomy, id: TermId) -> bool {
        self.books.values().any(|book| match taxonomy {
            Taxonomy::Kind => book.kind.id == id,
            Taxonomy::Genre => book.genre.id == id,
        })
    }

    fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a Book> + 'a {
        self.books.values().filter(move |book| predicate.matches(book))
    }
}

/// In-process catalog. Writers copy the state on write, so a snapshot is just
/// a clone of the `Arc` taken under the read lock.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<Arc<CatalogState>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemorySnapshot {
    state: Arc<CatalogState>,
}

#[async_trait]
impl CatalogSnapshot for MemorySnapshot {
    async fn term_exists(&mut self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError> {
        Ok(self.state.terms(taxonomy).contains_key(&id))
    }

    async fn count_books(&mut self, predicate: &Predicate) -> Result<usize, StorageError> {
        Ok(self.state.matching(predicate).count())
    }

    async fn fetch_books(
        &mut self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Book>, StorageError> {
        Ok(self
            .state
            .matching(predicate)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn snapshot(&self) -> Result<Box<dyn CatalogSnapshot>, StorageError> {
        let state = Arc::clone(&*self.state.read().await);
        Ok(Box::new(MemorySnapshot { state }))
    }

    async fn create_term(&self, taxonomy: Taxonomy, label: &str) -> Result<Term, StorageError> {
        let mut guard = self.state.write().await;
        if guard.terms(taxonomy).values().any(|term| term.label == label) {
            return Err(StorageError::Conflict(format!(
                "{} '{}' already exists",
                taxonomy, label
            )));
        }

        let state = Arc::make_mut(&mut *guard);
        let term = Term {
            id: state.next_term_id(taxonomy),
            label: label.to_string(),
        };
        state.terms_mut(taxonomy).insert(term.id, term.clone());
        Ok(term)
    }

    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StorageError> {
        let guard = self.state.read().await;
        Ok(guard.terms(taxonomy).values().cloned().collect())
    }

    async fn get_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Option<Term>, StorageError> {
        let guard = self.state.read().await;
        Ok(guard.terms(taxonomy).get(&id).cloned())
    }

    async fn delete_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError> {
        let mut guard = self.state.write().await;
        if !guard.terms(taxonomy).contains_key(&id) {
            return Ok(false);
        }
        if guard.is_referenced(taxonomy, id) {
            return Err(StorageError::Conflict(format!(
                "{} {} is still referenced by books",
                taxonomy, id
            )));
        }

        Arc::make_mut(&mut *guard).terms_mut(taxonomy).remove(&id);
        Ok(true)
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book, StorageError> {
        let mut guard = self.state.write().await;
        let kind = guard.term(Taxonomy::Kind, book.kind_id)?;
        let genre = guard.term(Taxonomy::Genre, book.genre_id)?;

        let state = Arc::make_mut(&mut *guard);
        let images = book
            .image_urls
            .iter()
            .map(|url| {
                state.last_image_id += 1;
                Image {
                    id: state.last_image_id,
                    url: url.clone(),
                }
            })
            .collect();

        state.last_book_id += 1;
        let stored = Book {
            id: state.last_book_id,
            name: book.name.clone(),
            author: book.author.clone(),
            price: book.price,
            release_year: book.release_year,
            kind,
            genre,
            keywords: book.keywords.clone(),
            images,
        };
        state.books.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        let guard = self.state.read().await;
        Ok(guard.books.get(&id).cloned())
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Option<Book>, StorageError> {
        let mut guard = self.state.write().await;
        let Some(mut book) = guard.books.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(kind_id) = patch.kind_id {
            book.kind = guard.term(Taxonomy::Kind, kind_id)?;
        }
        if let Some(genre_id) = patch.genre_id {
            book.genre = guard.term(Taxonomy::Genre, genre_id)?;
        }
        if let Some(name) = &patch.name {
            book.name = name.clone();
        }
        if let Some(author) = &patch.author {
            book.author = author.clone();
        }
        if let Some(price) = patch.price {
            book.price = price;
        }
        if let Some(year) = patch.release_year {
            book.release_year = year;
        }
        if let Some(keywords) = &patch.keywords {
            book.keywords = keywords.clone();
        }

        Arc::make_mut(&mut *guard).books.insert(id, book.clone());
        Ok(Some(book))
    }

    async fn delete_book(&self, id: BookId) -> Result<bool, StorageError> {
        let mut guard = self.state.write().await;
        if !guard.books.contains_key(&id) {
            return Ok(false);
        }
        Arc::make_mut(&mut *guard).books.remove(&id);
        Ok(true)
    }

    async fn book_count(&self) -> Result<usize, StorageError> {
        Ok(self.state.read().await.books.len())
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
