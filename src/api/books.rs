use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error_response;
use crate::auth::Claims;
use crate::models::user::UserSummary;
use crate::models::{BookSummary, ReviewDto};
use crate::services::book_service::{self, BookPatch, NewBook};
use crate::services::catalog::{self, CatalogQuery, SortDirection, SortKey, BOOKS_PER_PAGE};
use crate::services::rating;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksQuery {
    pub page: Option<u64>,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_order: Option<SortDirection>,
}

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Catalog page with pagination metadata")
    )
)]
pub async fn list_books(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListBooksQuery>,
) -> Response {
    let query = CatalogQuery {
        page: params.page.unwrap_or(1).max(1),
        page_size: BOOKS_PER_PAGE,
        search: params.search,
        genre: params.genre,
        sort_by: params.sort_by.unwrap_or_default(),
        sort_order: params.sort_order.unwrap_or_default(),
    };

    match catalog::query_catalog(&db, &query).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookDetailBody {
    #[serde(flatten)]
    summary: BookSummary,
    total_reviews: u64,
    rating_distribution: BTreeMap<u8, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
struct BookDetailResponse {
    book: BookDetailBody,
    reviews: Vec<ReviewDto>,
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book with rating summary and reviews"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(State(db): State<DatabaseConnection>, Path(id): Path<i32>) -> Response {
    match book_service::get_book_detail(&db, id).await {
        Ok(detail) => {
            let body = BookDetailResponse {
                book: BookDetailBody {
                    summary: BookSummary::from_model(detail.book, detail.rating.average_rating),
                    total_reviews: detail.rating.total_reviews,
                    rating_distribution: detail.rating.rating_distribution,
                    owner: detail.owner,
                },
                reviews: detail.reviews,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_book(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(req): Json<CreateBookRequest>,
) -> Response {
    // Absent fields become empty/zero and fail validation with field detail.
    let input = NewBook {
        title: req.title.unwrap_or_default(),
        author: req.author.unwrap_or_default(),
        description: req.description.unwrap_or_default(),
        genre: req.genre.unwrap_or_default(),
        published_year: req.published_year.unwrap_or_default(),
    };

    match book_service::create_book(&db, claims.user_id(), input).await {
        Ok(model) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book added successfully",
                "book": BookSummary::from_model(model, 0.0)
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 403, description = "Acting user does not own the book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateBookRequest>,
) -> Response {
    let patch = BookPatch {
        title: req.title,
        author: req.author,
        description: req.description,
        genre: req.genre,
        published_year: req.published_year,
    };

    let model = match book_service::update_book(&db, claims.user_id(), id, patch).await {
        Ok(model) => model,
        Err(e) => return error_response(e),
    };

    match rating::summarize(&db, model.id).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "message": "Book updated successfully",
                "book": BookSummary::from_model(model, summary.average_rating)
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book and its reviews deleted"),
        (status = 403, description = "Acting user does not own the book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Response {
    match book_service::delete_book(&db, claims.user_id(), id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Book and associated reviews deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
