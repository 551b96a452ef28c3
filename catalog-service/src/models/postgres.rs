use crate::models::catalog::{Book, BookId, BookPatch, Image, NewBook, Taxonomy, Term, TermId};
use crate::models::storage::{CatalogSnapshot, CatalogStore, StorageError};
use crate::services::search::predicate::Predicate;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row, Transaction};
use std::collections::HashMap;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS kinds (
        id BIGSERIAL PRIMARY KEY,
        label TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS genres (
        id BIGSERIAL PRIMARY KEY,
        label TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        author TEXT NOT NULL,
        price NUMERIC(10, 2) NOT NULL,
        release_year INTEGER NOT NULL,
        kind_id BIGINT NOT NULL REFERENCES kinds(id) ON DELETE RESTRICT,
        genre_id BIGINT NOT NULL REFERENCES genres(id) ON DELETE RESTRICT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_keywords (
        book_id BIGINT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        keyword TEXT NOT NULL,
        PRIMARY KEY (book_id, keyword)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_images (
        id BIGSERIAL PRIMARY KEY,
        book_id BIGINT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        url TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_book_keywords_keyword ON book_keywords(keyword)",
    "CREATE INDEX IF NOT EXISTS idx_books_kind ON books(kind_id)",
    "CREATE INDEX IF NOT EXISTS idx_books_genre ON books(genre_id)",
];

const BOOK_COLUMNS: &str = r#"
    SELECT b.id, b.name, b.author, b.price, b.release_year,
           k.id AS kind_id, k.label AS kind_label,
           g.id AS genre_id, g.label AS genre_label
    FROM books b
    JOIN kinds k ON k.id = b.kind_id
    JOIN genres g ON g.id = b.genre_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: i64,
    name: String,
    author: String,
    price: Decimal,
    release_year: i32,
    kind_id: i64,
    kind_label: String,
    genre_id: i64,
    genre_label: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TermRow {
    id: i64,
    label: String,
}

impl From<TermRow> for Term {
    fn from(row: TermRow) -> Self {
        Term {
            id: row.id,
            label: row.label,
        }
    }
}

/// Maps constraint violations onto `Conflict` so callers can tell them
/// apart from infrastructure failures.
fn classify(err: sqlx::Error, context: impl FnOnce() -> String) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() || db.is_foreign_key_violation() {
            return StorageError::Conflict(context());
        }
    }
    StorageError::Postgres(err)
}

/// Loads keywords and images for the given rows and assembles full books,
/// keeping the row order.
async fn hydrate(conn: &mut PgConnection, rows: Vec<BookRow>) -> Result<Vec<Book>, StorageError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let mut keywords: HashMap<i64, Vec<String>> = HashMap::new();
    let keyword_rows = sqlx::query(
        "SELECT book_id, keyword FROM book_keywords WHERE book_id = ANY($1) ORDER BY keyword",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;
    for row in keyword_rows {
        keywords
            .entry(row.get::<i64, _>("book_id"))
            .or_default()
            .push(row.get("keyword"));
    }

    let mut images: HashMap<i64, Vec<Image>> = HashMap::new();
    let image_rows = sqlx::query(
        "SELECT id, book_id, url FROM book_images WHERE book_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;
    for row in image_rows {
        images
            .entry(row.get::<i64, _>("book_id"))
            .or_default()
            .push(Image {
                id: row.get("id"),
                url: row.get("url"),
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| Book {
            keywords: keywords.remove(&row.id).unwrap_or_default(),
            images: images.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            author: row.author,
            price: row.price,
            release_year: row.release_year,
            kind: Term {
                id: row.kind_id,
                label: row.kind_label,
            },
            genre: Term {
                id: row.genre_id,
                label: row.genre_label,
            },
        })
        .collect())
}

async fn load_book(conn: &mut PgConnection, id: BookId) -> Result<Option<Book>, StorageError> {
    let row = sqlx::query_as::<_, BookRow>(&format!("{BOOK_COLUMNS} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!("Catalog schema ready");

        Ok(Self { pool })
    }
}

/// Read-only repeatable-read transaction. Dropping it rolls back.
pub struct PostgresSnapshot {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogSnapshot for PostgresSnapshot {
    async fn term_exists(&mut self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            taxonomy.table()
        ))
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row.get(0))
    }

    async fn count_books(&mut self, predicate: &Predicate) -> Result<usize, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books b");
        predicate.push_where(&mut builder);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(count as usize)
    }

    async fn fetch_books(
        &mut self,
        predicate: &Predicate,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Book>, StorageError> {
        let mut builder = QueryBuilder::<Postgres>::new(BOOK_COLUMNS);
        predicate.push_where(&mut builder);
        builder
            .push(" ORDER BY b.id ASC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        let rows: Vec<BookRow> = builder.build_query_as().fetch_all(&mut *self.tx).await?;
        hydrate(&mut self.tx, rows).await
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn snapshot(&self) -> Result<Box<dyn CatalogSnapshot>, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PostgresSnapshot { tx }))
    }

    async fn create_term(&self, taxonomy: Taxonomy, label: &str) -> Result<Term, StorageError> {
        sqlx::query_as::<_, TermRow>(&format!(
            "INSERT INTO {} (label) VALUES ($1) RETURNING id, label",
            taxonomy.table()
        ))
        .bind(label)
        .fetch_one(&self.pool)
        .await
        .map(Term::from)
        .map_err(|e| classify(e, || format!("{} '{}' already exists", taxonomy, label)))
    }

    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, StorageError> {
        let rows = sqlx::query_as::<_, TermRow>(&format!(
            "SELECT id, label FROM {} ORDER BY id",
            taxonomy.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Term::from).collect())
    }

    async fn get_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<Option<Term>, StorageError> {
        let row = sqlx::query_as::<_, TermRow>(&format!(
            "SELECT id, label FROM {} WHERE id = $1",
            taxonomy.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Term::from))
    }

    async fn delete_term(&self, taxonomy: Taxonomy, id: TermId) -> Result<bool, StorageError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", taxonomy.table()))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, || format!("{} {} is still referenced by books", taxonomy, id)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book, StorageError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (name, author, price, release_year, kind_id, genre_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&book.name)
        .bind(&book.author)
        .bind(book.price)
        .bind(book.release_year)
        .bind(book.kind_id)
        .bind(book.genre_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            classify(e, || {
                format!("kind {} or genre {} does not exist", book.kind_id, book.genre_id)
            })
        })?;

        for keyword in &book.keywords {
            sqlx::query("INSERT INTO book_keywords (book_id, keyword) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(id)
                .bind(keyword)
                .execute(&mut *tx)
                .await?;
        }
        for url in &book.image_urls {
            sqlx::query("INSERT INTO book_images (book_id, url) VALUES ($1, $2)")
                .bind(id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        let stored = load_book(&mut tx, id).await?;
        tx.commit().await?;

        stored.ok_or_else(|| StorageError::Connection(format!("book {} vanished after insert", id)))
    }

    async fn get_book(&self, id: BookId) -> Result<Option<Book>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        load_book(&mut conn, id).await
    }

    async fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Option<Book>, StorageError> {
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE books SET id = id");
        if let Some(name) = &patch.name {
            builder.push(", name = ").push_bind(name.clone());
        }
        if let Some(author) = &patch.author {
            builder.push(", author = ").push_bind(author.clone());
        }
        if let Some(price) = patch.price {
            builder.push(", price = ").push_bind(price);
        }
        if let Some(year) = patch.release_year {
            builder.push(", release_year = ").push_bind(year);
        }
        if let Some(kind_id) = patch.kind_id {
            builder.push(", kind_id = ").push_bind(kind_id);
        }
        if let Some(genre_id) = patch.genre_id {
            builder.push(", genre_id = ").push_bind(genre_id);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| classify(e, || format!("book {} references a missing kind or genre", id)))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(keywords) = &patch.keywords {
            sqlx::query("DELETE FROM book_keywords WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for keyword in keywords {
                sqlx::query("INSERT INTO book_keywords (book_id, keyword) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                    .bind(id)
                    .bind(keyword)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let stored = load_book(&mut tx, id).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn delete_book(&self, id: BookId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn book_count(&self) -> Result<usize, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as usize)
    }

    async fn test_connection(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
