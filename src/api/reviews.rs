use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::auth::Claims;
use crate::models::user::{self, UserSummary};
use crate::models::{review, ReviewDto};
use crate::services::review_service::{self, ReviewInput, ReviewPatch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

async fn decorate(db: &DatabaseConnection, model: review::Model) -> ReviewDto {
    let reviewer = user::Entity::find_by_id(model.user_id)
        .one(db)
        .await
        .ok()
        .flatten()
        .map(UserSummary::from);
    ReviewDto::from_model(model, reviewer)
}

pub async fn create_review(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(book_id): Path<i32>,
    Json(req): Json<CreateReviewRequest>,
) -> Response {
    let input = ReviewInput {
        rating: req.rating.unwrap_or_default(),
        review_text: req.review_text.unwrap_or_default(),
    };

    match review_service::submit_review(&db, claims.user_id(), book_id, input).await {
        Ok(model) => {
            let dto = decorate(&db, model).await;
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Review added successfully",
                    "review": dto
                })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn update_review(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(review_id): Path<i32>,
    Json(req): Json<UpdateReviewRequest>,
) -> Response {
    let patch = ReviewPatch {
        rating: req.rating,
        review_text: req.review_text,
    };

    match review_service::update_review(&db, claims.user_id(), review_id, patch).await {
        Ok(model) => {
            let dto = decorate(&db, model).await;
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Review updated successfully",
                    "review": dto
                })),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn delete_review(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(review_id): Path<i32>,
) -> Response {
    match review_service::delete_review(&db, claims.user_id(), review_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Review deleted successfully" })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
