use crate::error::{ApiError, ApiResult};
use crate::models::requests::{PageParams, SearchRequest};
use crate::models::responses::SearchResponse;
use crate::services::search::SearchCriteria;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Json,
};
use tracing::info;

const SEARCH_PATH: &str = "/books/search";
const BROWSE_PATH: &str = "/books";

/// An empty body is the same as `{}`: browse everything.
fn parse_body(body: &Bytes) -> ApiResult<SearchRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SearchRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid search body: {}", e)))
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    body: Bytes,
) -> ApiResult<Json<SearchResponse>> {
    let page = params.page()?;
    let criteria = parse_body(&body)?.into_criteria(page)?;
    info!("Search request: {:?}", criteria);

    let result = state.engine.search(&criteria).await?;
    Ok(Json(SearchResponse::from_page(result, SEARCH_PATH)))
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<SearchResponse>> {
    let criteria = SearchCriteria::browse(params.page()?);
    let result = state.engine.search(&criteria).await?;
    Ok(Json(SearchResponse::from_page(result, BROWSE_PATH)))
}
