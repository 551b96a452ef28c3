use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    backend: String,
    books: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct KindResponse {
    id: i64,
    kind: String,
}

#[derive(Debug, Deserialize)]
struct GenreResponse {
    id: i64,
    genre: String,
}

#[derive(Debug, Deserialize)]
struct BookResponse {
    id: i64,
    name: String,
    author: String,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<BookResponse>,
    total_items: usize,
    total_pages: usize,
}

#[derive(Debug, Serialize)]
struct CreateBook {
    name: &'static str,
    author: &'static str,
    price: f64,
    release_year: i32,
    kind_id: i64,
    genre_id: i64,
    keywords: Vec<&'static str>,
    imgs: Vec<String>,
}

struct SampleBook {
    name: &'static str,
    author: &'static str,
    price: f64,
    release_year: i32,
    kind: &'static str,
    genre: &'static str,
    keywords: &'static [&'static str],
}

const SAMPLE_BOOKS: &[SampleBook] = &[
    SampleBook {
        name: "Dom Casmurro",
        author: "Machado de Assis",
        price: 29.90,
        release_year: 1899,
        kind: "livro",
        genre: "romance",
        keywords: &["realismo", "clássico"],
    },
    SampleBook {
        name: "O Pequeno Príncipe",
        author: "Antoine de Saint Exupéry",
        price: 39.90,
        release_year: 1943,
        kind: "livro",
        genre: "fábula",
        keywords: &["infantil", "filosófico", "clássico"],
    },
    SampleBook {
        name: "Pride and Prejudice",
        author: "Jane Austen",
        price: 54.50,
        release_year: 1813,
        kind: "livro",
        genre: "romance",
        keywords: &["marriage", "classic"],
    },
    SampleBook {
        name: "Frankenstein",
        author: "Mary Wollstonecraft Shelley",
        price: 45.00,
        release_year: 1818,
        kind: "livro",
        genre: "terror",
        keywords: &["gothic", "science"],
    },
    SampleBook {
        name: "Watchmen",
        author: "Alan Moore",
        price: 120.00,
        release_year: 1987,
        kind: "hq",
        genre: "ficção",
        keywords: &["super-heróis", "distopia"],
    },
];

const SMOKE_SEARCHES: &[(&str, fn() -> Value)] = &[
    ("browse", || json!({})),
    ("query 'príncipe'", || json!({"query": "príncipe"})),
    ("query ' CLÁSSICO '", || json!({"query": " CLÁSSICO "})),
    ("min_price 50", || json!({"filters": {"min_price": 50}})),
    ("year 1818", || json!({"filters": {"release_year": 1818}})),
];

struct ControlModule {
    client: Client,
    base_url: String,
}

impl ControlModule {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_for_service(&self) {
        info!("Waiting for catalog service at {}...", self.base_url);

        loop {
            match self.client.get(self.url("/status")).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Catalog service is ready");
                    return;
                }
                Ok(response) => {
                    warn!("Catalog service responded with status: {}", response.status());
                }
                Err(e) => {
                    warn!("Catalog service not ready: {}", e);
                }
            }
            sleep(Duration::from_secs(2)).await;
        }
    }

    async fn status(&self) -> Result<HealthResponse, Box<dyn std::error::Error>> {
        let response = self.client.get(self.url("/status")).send().await?;
        Ok(response.error_for_status()?.json().await?)
    }

    /// Creates the kind, or finds it when it already exists.
    async fn ensure_kind(&self, label: &str) -> Result<i64, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(self.url("/kinds"))
            .json(&json!({ "kind": label }))
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let kinds: Vec<KindResponse> = self.client.get(self.url("/kinds")).send().await?.json().await?;
            return kinds
                .into_iter()
                .find(|kind| kind.kind == label)
                .map(|kind| kind.id)
                .ok_or_else(|| format!("kind '{}' conflicted but was not listed", label).into());
        }

        let kind: KindResponse = response.error_for_status()?.json().await?;
        Ok(kind.id)
    }

    async fn ensure_genre(&self, label: &str) -> Result<i64, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(self.url("/genres"))
            .json(&json!({ "genre": label }))
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let genres: Vec<GenreResponse> = self.client.get(self.url("/genres")).send().await?.json().await?;
            return genres
                .into_iter()
                .find(|genre| genre.genre == label)
                .map(|genre| genre.id)
                .ok_or_else(|| format!("genre '{}' conflicted but was not listed", label).into());
        }

        let genre: GenreResponse = response.error_for_status()?.json().await?;
        Ok(genre.id)
    }

    async fn seed_book(&self, sample: &SampleBook) -> Result<i64, Box<dyn std::error::Error>> {
        let kind_id = self.ensure_kind(sample.kind).await?;
        let genre_id = self.ensure_genre(sample.genre).await?;

        let book = CreateBook {
            name: sample.name,
            author: sample.author,
            price: sample.price,
            release_year: sample.release_year,
            kind_id,
            genre_id,
            keywords: sample.keywords.to_vec(),
            imgs: vec![format!(
                "https://img.example/{}.jpg",
                sample.name.to_lowercase().replace(' ', "-")
            )],
        };

        let response = self.client.post(self.url("/books")).json(&book).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Failed to create '{}': {} {}", sample.name, status, body).into());
        }

        let created: BookResponse = response.json().await?;
        Ok(created.id)
    }

    async fn seed_catalog(&self) {
        info!("Seeding {} sample books", SAMPLE_BOOKS.len());

        let mut created = 0;
        for sample in SAMPLE_BOOKS {
            match self.seed_book(sample).await {
                Ok(id) => {
                    created += 1;
                    info!("✓ Book {} '{}' created", id, sample.name);
                }
                Err(e) => error!("✗ Failed to seed '{}': {}", sample.name, e),
            }
        }

        info!("Seeding complete: {}/{} books created", created, SAMPLE_BOOKS.len());
    }

    async fn search(&self, body: &Value, page: u32) -> Result<SearchResponse, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(self.url("/books/search"))
            .query(&[("page", page)])
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Search failed: {} {}", status, body).into());
        }

        Ok(response.json().await?)
    }

    async fn run_smoke_searches(&self) {
        for (label, body) in SMOKE_SEARCHES {
            match self.search(&body(), 1).await {
                Ok(result) => info!(
                    "Search {}: {} items over {} pages",
                    label, result.total_items, result.total_pages
                ),
                Err(e) => error!("Search {} failed: {}", label, e),
            }
        }
    }

    async fn run_single_search(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        let result = self.search(&json!({ "query": text }), 1).await?;
        info!(
            "Search '{}': {} items over {} pages",
            text, result.total_items, result.total_pages
        );
        for book in result.data {
            info!("  #{} {} by {} ({:.2})", book.id, book.name, book.author, book.price);
        }
        Ok(())
    }

    async fn watch_mode(&self) {
        info!("Starting watch mode...");

        loop {
            match self.status().await {
                Ok(health) => info!(
                    "[{}] catalog {} on {}: {} books",
                    Utc::now().format("%Y-%m-%d %H:%M:%S"),
                    health.status,
                    health.backend,
                    health
                        .books
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
                Err(e) => error!("Failed to get catalog status: {}", e),
            }

            sleep(Duration::from_secs(30)).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("control_module=info")
        .init();

    let base_url = std::env::var("CATALOG_SERVICE_URL")
        .unwrap_or_else(|_| "http://0.0.0.0:7003".to_string());
    let control = ControlModule::new(base_url.trim_end_matches('/').to_string());

    control.wait_for_service().await;

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--watch") => control.watch_mode().await,
        Some("--search") => match args.get(2) {
            Some(text) => control.run_single_search(text).await?,
            None => {
                error!("Missing search text");
                info!("Usage: control-module [--search <text> | --watch]");
                std::process::exit(1);
            }
        },
        Some(other) => {
            error!("Unknown argument: {}", other);
            info!("Usage: control-module [--search <text> | --watch]");
            std::process::exit(1);
        }
        None => {
            let started = Utc::now();
            control.seed_catalog().await;
            control.run_smoke_searches().await;
            info!(
                "Run complete in {}ms",
                (Utc::now() - started).num_milliseconds()
            );
        }
    }

    Ok(())
}
