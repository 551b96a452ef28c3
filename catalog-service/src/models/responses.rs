use crate::models::catalog::{Book, Image, Term};
use crate::services::search::ResultPage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub backend: String,
    pub books: Option<usize>,
    pub checked_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindResponse {
    pub id: i64,
    pub kind: String,
}

impl From<Term> for KindResponse {
    fn from(term: Term) -> Self {
        Self {
            id: term.id,
            kind: term.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreResponse {
    pub id: i64,
    pub genre: String,
}

impl From<Term> for GenreResponse {
    fn from(term: Term) -> Self {
        Self {
            id: term.id,
            genre: term.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageResponse {
    pub id: i64,
    pub url: String,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            url: image.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookResponse {
    pub id: i64,
    pub name: String,
    pub author: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub release_year: i32,
    pub kind: KindResponse,
    pub genre: GenreResponse,
    pub imgs: Vec<ImageResponse>,
    pub keywords: Vec<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            author: book.author,
            price: book.price,
            release_year: book.release_year,
            kind: book.kind.into(),
            genre: book.genre.into(),
            imgs: book.images.into_iter().map(ImageResponse::from).collect(),
            keywords: book.keywords,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<BookResponse>,
    pub total_items: usize,
    pub total_pages: usize,
    pub page: u32,
    pub per_page: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
}

impl SearchResponse {
    /// `base_path` is the route the page links point back to.
    pub fn from_page(page: ResultPage<Book>, base_path: &str) -> Self {
        let window = page.window;
        let link = |n: u32| format!("{}?page={}", base_path, n);

        Self {
            data: page.items.into_iter().map(BookResponse::from).collect(),
            total_items: window.total_items,
            total_pages: window.total_pages,
            page: window.page,
            per_page: window.per_page,
            has_prev: window.has_prev(),
            has_next: window.has_next(),
            prev_page: window.prev_page().map(link),
            next_page: window.next_page().map(link),
        }
    }
}
