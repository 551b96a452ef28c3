use crate::error::ApiResult;
use crate::models::requests::{CreateBookRequest, UpdateBookRequest};
use crate::models::responses::BookResponse;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    let Json(request) = payload?;
    let book = state.catalog.create_book(request.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> ApiResult<Json<BookResponse>> {
    let book = state.catalog.get_book(book_id).await?;
    Ok(Json(book.into()))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> ApiResult<Json<BookResponse>> {
    let Json(request) = payload?;
    let book = state.catalog.update_book(book_id, request.into()).await?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.catalog.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
