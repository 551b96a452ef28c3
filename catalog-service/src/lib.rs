//! Book catalog service: kinds, genres and books over a pluggable store,
//! with filtered, paginated search.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use models::storage::CatalogStore;
use services::catalog::CatalogService;
use services::search::SearchEngine;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type Backend = Arc<dyn CatalogStore + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub store: Backend,
    pub engine: SearchEngine,
    pub catalog: CatalogService,
    pub backend: &'static str,
}

impl AppState {
    pub fn new(store: Backend, backend: &'static str) -> Self {
        Self {
            engine: SearchEngine::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store)),
            store,
            backend,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    use routes::{books, health, search, terms};

    Router::new()
        .route("/status", get(health::health_check))
        .route("/books", get(search::list_books).post(books::create_book))
        .route("/books/search", post(search::search_books))
        .route(
            "/books/:book_id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/kinds", get(terms::list_kinds).post(terms::create_kind))
        .route("/kinds/:id", get(terms::get_kind).delete(terms::delete_kind))
        .route("/genres", get(terms::list_genres).post(terms::create_genre))
        .route("/genres/:id", get(terms::get_genre).delete(terms::delete_genre))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
