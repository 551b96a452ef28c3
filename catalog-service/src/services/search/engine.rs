use super::criteria::SearchCriteria;
use super::pagination::{PageOutOfRange, PageWindow, ResultPage};
use super::predicate::Predicate;
use super::validator::validate_references;
use crate::models::catalog::{Book, Entity};
use crate::models::storage::{CatalogStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("Page {0} does not exist")]
    PageOutOfRange(u32),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<PageOutOfRange> for SearchError {
    fn from(PageOutOfRange(page): PageOutOfRange) -> Self {
        SearchError::PageOutOfRange(page)
    }
}

/// Stateless search orchestrator. Each call opens its own snapshot, so any
/// number of searches can run concurrently with catalog writes.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn CatalogStore + Send + Sync>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn CatalogStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// validate references, compose the predicate, count, fetch one page.
    /// Failures are returned as-is, never retried.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<ResultPage<Book>, SearchError> {
        let mut snapshot = self.store.snapshot().await?;

        validate_references(snapshot.as_mut(), criteria).await?;

        let predicate = Predicate::compose(criteria);
        let total = snapshot.count_books(&predicate).await?;
        let window = PageWindow::new(total, criteria.page)?;

        debug!(
            criteria = predicate.criteria().len(),
            total,
            page = window.page,
            "search window computed"
        );

        if window.is_empty() {
            return Ok(ResultPage::empty(window));
        }

        let items = snapshot
            .fetch_books(&predicate, window.offset(), window.per_page)
            .await?;

        Ok(ResultPage { items, window })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{NewBook, Taxonomy, TermId};
    use crate::models::memory::MemoryCatalog;
    use rust_decimal::Decimal;

    struct Fixture {
        engine: SearchEngine,
        livro: TermId,
        revista: TermId,
        fabula: TermId,
    }

    async fn fixture(filler: usize) -> Fixture {
        let store = Arc::new(MemoryCatalog::new());
        let livro = store.create_term(Taxonomy::Kind, "livro").await.unwrap().id;
        let revista = store.create_term(Taxonomy::Kind, "revista").await.unwrap().id;
        let fabula = store.create_term(Taxonomy::Genre, "fábula").await.unwrap().id;

        let book = |name: &str, author: &str, cents: i64, year: i32, kind_id: TermId, keywords: &[&str]| NewBook {
            name: name.to_string(),
            author: author.to_string(),
            price: Decimal::new(cents, 2),
            release_year: year,
            kind_id,
            genre_id: fabula,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            image_urls: vec!["https://img.example/cover.jpg".to_string()],
        };

        store
            .create_book(&book("Dom Casmurro", "Machado de Assis", 2990, 1899, livro, &["romance"]))
            .await
            .unwrap();
        store
            .create_book(&book(
                "O Pequeno Príncipe",
                "Antoine de Saint Exupéry",
                5000,
                1943,
                livro,
                &["clássico", "filosófico", "infantil"],
            ))
            .await
            .unwrap();
        store
            .create_book(&book("Superinteressante", "Abril", 1500, 1987, revista, &["ciência"]))
            .await
            .unwrap();
        for i in 0..filler {
            store
                .create_book(&book(&format!("Volume {i}"), "Vários", 9900, 2020, revista, &["coleção"]))
                .await
                .unwrap();
        }

        Fixture {
            engine: SearchEngine::new(store),
            livro,
            revista,
            fabula,
        }
    }

    fn ids(page: &ResultPage<Book>) -> Vec<i64> {
        page.items.iter().map(|book| book.id).collect()
    }

    #[tokio::test]
    async fn browse_returns_everything_in_id_order() {
        let fx = fixture(0).await;
        let page = fx.engine.search(&SearchCriteria::default()).await.unwrap();
        assert_eq!(ids(&page), vec![1, 2, 3]);
        assert_eq!(page.window.total_items, 3);
        assert_eq!(page.window.total_pages, 1);
    }

    #[tokio::test]
    async fn query_is_trimmed_and_case_folded() {
        let fx = fixture(0).await;
        let plain = fx
            .engine
            .search(&SearchCriteria::default().with_query("príncipe"))
            .await
            .unwrap();
        let shouted = fx
            .engine
            .search(&SearchCriteria::default().with_query(" PRÍNCIPE "))
            .await
            .unwrap();

        assert_eq!(ids(&plain), vec![2]);
        assert_eq!(plain, shouted);
    }

    #[tokio::test]
    async fn min_price_is_inclusive() {
        let fx = fixture(0).await;
        let criteria = SearchCriteria::default().with_price_range(Some(Decimal::new(50, 0)), None);
        let page = fx.engine.search(&criteria).await.unwrap();
        assert_eq!(ids(&page), vec![2]);
    }

    #[tokio::test]
    async fn every_result_satisfies_every_criterion() {
        let fx = fixture(5).await;
        let criteria = SearchCriteria::default()
            .with_kind(fx.revista)
            .with_genre(fx.fabula)
            .with_release_year(2020)
            .with_price_range(Some(Decimal::new(90, 0)), Some(Decimal::new(100, 0)))
            .with_query("volume");

        let page = fx.engine.search(&criteria).await.unwrap();
        assert_eq!(page.items.len(), 5);
        for book in &page.items {
            assert_eq!(book.kind.id, fx.revista);
            assert_eq!(book.release_year, 2020);
            assert!(book.name.to_lowercase().contains("volume"));
        }
    }

    #[tokio::test]
    async fn pages_cover_all_matches() {
        // 23 filler revistas + 3 seed books = 26 matches for browse
        let fx = fixture(23).await;

        let first = fx.engine.search(&SearchCriteria::browse(1)).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert!(first.window.has_next());
        assert_eq!(first.window.next_page(), Some(2));

        let second = fx.engine.search(&SearchCriteria::browse(2)).await.unwrap();
        assert_eq!(second.items.len(), 6);
        assert!(!second.window.has_next());
        assert_eq!(second.window.prev_page(), Some(1));

        assert_eq!(first.items.len() + second.items.len(), first.window.total_items);
        assert!(first.items.last().unwrap().id < second.items[0].id);

        let err = fx.engine.search(&SearchCriteria::browse(3)).await.unwrap_err();
        assert!(matches!(err, SearchError::PageOutOfRange(3)));
    }

    #[tokio::test]
    async fn unknown_kind_is_not_found_even_without_other_filters() {
        let fx = fixture(0).await;
        let err = fx
            .engine
            .search(&SearchCriteria::default().with_kind(999_999))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::NotFound {
                entity: Entity::Kind,
                id: 999_999
            }
        ));
    }

    #[tokio::test]
    async fn empty_result_tolerates_any_page() {
        let fx = fixture(0).await;
        let criteria = SearchCriteria::default().with_kind(fx.livro).with_release_year(1500);

        let page = fx.engine.search(&criteria.clone().on_page(4)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.window.total_pages, 0);
        assert_eq!(page.window.total_items, 0);
    }

    #[tokio::test]
    async fn repeated_searches_are_identical() {
        let fx = fixture(30).await;
        let criteria = SearchCriteria::default().with_query("vários").on_page(2);
        let a = fx.engine.search(&criteria).await.unwrap();
        let b = fx.engine.search(&criteria).await.unwrap();
        assert_eq!(a, b);
    }
}
