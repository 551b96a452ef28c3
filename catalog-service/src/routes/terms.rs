//! Kind and genre endpoints. Both tables behave the same; only the JSON
//! field name differs (`kind` vs `genre`).

use crate::error::ApiResult;
use crate::models::catalog::Taxonomy;
use crate::models::requests::{CreateGenreRequest, CreateKindRequest};
use crate::models::responses::{GenreResponse, KindResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

pub async fn create_kind(
    State(state): State<AppState>,
    payload: Result<Json<CreateKindRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<KindResponse>)> {
    let Json(request) = payload?;
    let term = state.catalog.create_term(Taxonomy::Kind, &request.kind).await?;
    Ok((StatusCode::CREATED, Json(term.into())))
}

pub async fn list_kinds(State(state): State<AppState>) -> ApiResult<Json<Vec<KindResponse>>> {
    let terms = state.catalog.list_terms(Taxonomy::Kind).await?;
    Ok(Json(terms.into_iter().map(KindResponse::from).collect()))
}

pub async fn get_kind(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<KindResponse>> {
    let term = state.catalog.get_term(Taxonomy::Kind, id).await?;
    Ok(Json(term.into()))
}

pub async fn delete_kind(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.catalog.delete_term(Taxonomy::Kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_genre(
    State(state): State<AppState>,
    payload: Result<Json<CreateGenreRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GenreResponse>)> {
    let Json(request) = payload?;
    let term = state.catalog.create_term(Taxonomy::Genre, &request.genre).await?;
    Ok((StatusCode::CREATED, Json(term.into())))
}

pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<GenreResponse>>> {
    let terms = state.catalog.list_terms(Taxonomy::Genre).await?;
    Ok(Json(terms.into_iter().map(GenreResponse::from).collect()))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<GenreResponse>> {
    let term = state.catalog.get_term(Taxonomy::Genre, id).await?;
    Ok(Json(term.into()))
}

pub async fn delete_genre(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.catalog.delete_term(Taxonomy::Genre, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
