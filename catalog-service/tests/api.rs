use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use catalog_service::models::memory::MemoryCatalog;
use catalog_service::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::new(Arc::new(MemoryCatalog::new()), "memory"))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Seeds two kinds, one genre, the little prince (id 2) and `filler` more
/// books priced at 99.90.
async fn seeded(filler: usize) -> Router {
    let app = app();
    let (status, _) = send(&app, "POST", "/kinds", Some(json!({"kind": "Livro"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    send(&app, "POST", "/kinds", Some(json!({"kind": "revista"}))).await;
    send(&app, "POST", "/genres", Some(json!({"genre": "Fábula"}))).await;

    let books = [
        json!({
            "name": "Dom Casmurro", "author": "Machado de Assis", "price": 29.9,
            "release_year": 1899, "kind_id": 1, "genre_id": 1,
            "keywords": ["romance"], "imgs": ["https://img.example/dom.jpg"]
        }),
        json!({
            "name": "O Pequeno Príncipe", "author": "Antoine de Saint Exupéry", "price": "50.00",
            "release_year": 1943, "kind_id": 1, "genre_id": 1,
            "keywords": ["Infantil", "filosófico", "clássico"], "imgs": ["https://img.example/p.jpg"]
        }),
    ];
    for book in books {
        let (status, _) = send(&app, "POST", "/books", Some(book)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    for i in 0..filler {
        let (status, _) = send(
            &app,
            "POST",
            "/books",
            Some(json!({
                "name": format!("Revista {i}"), "author": "Editora", "price": 99.9,
                "release_year": 2020, "kind_id": 2, "genre_id": 1,
                "keywords": ["periódico"], "imgs": ["https://img.example/r.jpg"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

fn data_ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn status_reports_book_count() {
    let app = seeded(0).await;
    let (status, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["books"], 2);
}

#[tokio::test]
async fn search_by_query_ignores_case_and_whitespace() {
    let app = seeded(0).await;

    let (status, plain) = send(&app, "POST", "/books/search", Some(json!({"query": "príncipe"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, shouted) = send(&app, "POST", "/books/search", Some(json!({"query": " PRÍNCIPE "}))).await;

    assert_eq!(data_ids(&plain), vec![2]);
    assert_eq!(plain, shouted);

    let book = &plain["data"][0];
    assert_eq!(book["kind"], json!({"id": 1, "kind": "livro"}));
    assert_eq!(book["genre"], json!({"id": 1, "genre": "fábula"}));
    assert_eq!(book["keywords"], json!(["clássico", "filosófico", "infantil"]));
    assert_eq!(book["price"], json!(50.0));
}

#[tokio::test]
async fn empty_body_browses_everything() {
    let app = seeded(0).await;
    let (status, body) = send(&app, "POST", "/books/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data_ids(&body), vec![1, 2]);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["per_page"], 20);
    assert_eq!(body["prev_page"], Value::Null);
    assert_eq!(body["next_page"], Value::Null);
}

#[tokio::test]
async fn pagination_envelope_over_two_pages() {
    // 2 seed books + 24 revistas = 26
    let app = seeded(24).await;

    let (status, first) = send(&app, "POST", "/books/search?page=1", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"].as_array().unwrap().len(), 20);
    assert_eq!(first["total_items"], 26);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["has_next"], true);
    assert_eq!(first["has_prev"], false);
    assert_eq!(first["next_page"], "/books/search?page=2");

    let (_, second) = send(&app, "POST", "/books/search?page=2", Some(json!({}))).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 6);
    assert_eq!(second["has_next"], false);
    assert_eq!(second["prev_page"], "/books/search?page=1");

    let mut all = data_ids(&first);
    all.extend(data_ids(&second));
    assert_eq!(all, (1..=26).collect::<Vec<i64>>());

    let (status, body) = send(&app, "POST", "/books/search?page=3", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn browse_route_links_to_itself() {
    let app = seeded(24).await;
    let (status, body) = send(&app, "GET", "/books?page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_page"], "/books?page=2");
}

#[tokio::test]
async fn filters_combine_conjunctively() {
    let app = seeded(3).await;

    let (_, body) = send(
        &app,
        "POST",
        "/books/search",
        Some(json!({"filters": {"min_price": 50}})),
    )
    .await;
    assert_eq!(data_ids(&body), vec![2, 3, 4, 5]);

    let (_, body) = send(
        &app,
        "POST",
        "/books/search",
        Some(json!({"filters": {"min_price": 50, "kind_id": 1}})),
    )
    .await;
    assert_eq!(data_ids(&body), vec![2]);

    let (_, body) = send(
        &app,
        "POST",
        "/books/search",
        Some(json!({"query": "revista", "filters": {"release_year": 1899}})),
    )
    .await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn unknown_kind_is_404_not_empty() {
    let app = seeded(0).await;
    let (status, body) = send(
        &app,
        "POST",
        "/books/search",
        Some(json!({"filters": {"kind_id": 999999}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "kind 999999 not found");
}

#[tokio::test]
async fn invalid_search_input_is_400() {
    let app = seeded(0).await;

    let (status, _) = send(&app, "POST", "/books/search?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/books/search",
        Some(json!({"filters": {"max_price": -3}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_lifecycle() {
    let app = seeded(0).await;

    let (status, body) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dom Casmurro");
    assert_eq!(body["imgs"][0]["url"], "https://img.example/dom.jpg");

    let (status, body) = send(&app, "PATCH", "/books/1", Some(json!({"price": 35, "keywords": ["Realismo"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], json!(35.0));
    assert_eq!(body["keywords"], json!(["realismo"]));

    let (_, body) = send(&app, "POST", "/books/search", Some(json!({"query": "realismo"}))).await;
    assert_eq!(data_ids(&body), vec![1]);

    let (status, _) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn book_creation_rules() {
    let app = seeded(0).await;

    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "name": "Sem Gênero", "author": "Ninguém", "price": 10, "release_year": 2000,
            "kind_id": 1, "genre_id": 42, "keywords": ["x"], "imgs": ["https://img.example/x.jpg"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "name": "Sem Imagem", "author": "Ninguém", "price": 10, "release_year": 2000,
            "kind_id": 1, "genre_id": 1, "keywords": ["x"], "imgs": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/books", Some(json!({"name": "incompleto"}))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn terms_are_normalized_unique_and_protected() {
    let app = seeded(0).await;

    let (_, kinds) = send(&app, "GET", "/kinds", None).await;
    assert_eq!(kinds, json!([{"id": 1, "kind": "livro"}, {"id": 2, "kind": "revista"}]));

    let (status, _) = send(&app, "POST", "/kinds", Some(json!({"kind": " LIVRO "}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", "/genres/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", "/genres/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "genre": "fábula"}));

    let (status, _) = send(&app, "DELETE", "/kinds/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/kinds/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
