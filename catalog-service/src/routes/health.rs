use crate::models::responses::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::error;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, books) = match state.store.test_connection().await {
        Ok(()) => ("running", state.store.book_count().await.ok()),
        Err(e) => {
            error!("Catalog store unreachable: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        service: "catalog-service".to_string(),
        status: status.to_string(),
        backend: state.backend.to_string(),
        books,
        checked_at: Utc::now().to_rfc3339(),
    })
}
