pub mod auth;
pub mod books;
pub mod health;
pub mod reviews;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::domain::DomainError;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Reviews: POST takes a book id, PUT/DELETE take a review id
        .route(
            "/reviews/:id",
            post(reviews::create_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .with_state(db)
}

/// Single place where domain failures become HTTP responses; the domain layer
/// itself stays framework-free.
pub(crate) fn error_response(err: DomainError) -> Response {
    match err {
        DomainError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{} not found", what) })),
        )
            .into_response(),
        DomainError::Forbidden(msg) => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
        }
        DomainError::Validation { field, message } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": message, "field": field })),
        )
            .into_response(),
        DomainError::DuplicateReview => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "You have already reviewed this book" })),
        )
            .into_response(),
        err @ (DomainError::Cascade(_) | DomainError::Database(_)) => {
            tracing::error!("store failure: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
