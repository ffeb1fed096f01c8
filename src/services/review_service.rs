//! Review Service - submission, uniqueness, and owner-gated edits
//!
//! Uniqueness of (book, user) is decided by the store's unique index. The
//! pre-insert lookup is only a fast path for the common case; two racing
//! submissions both pass it and the index still rejects exactly one.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
    SqlErr,
};

use crate::domain::DomainError;
use crate::models::{book, review};

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: i32,
    pub review_text: String,
}

/// Partial update; `None` fields retain their stored value.
#[derive(Debug, Default, Clone)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}

fn validate_rating(rating: i32) -> Result<(), DomainError> {
    if !(1..=5).contains(&rating) {
        return Err(DomainError::validation(
            "rating",
            "must be an integer between 1 and 5",
        ));
    }
    Ok(())
}

fn validate_review_text(text: &str) -> Result<(), DomainError> {
    if text.trim().len() < 5 {
        return Err(DomainError::validation(
            "reviewText",
            "must be at least 5 characters",
        ));
    }
    Ok(())
}

pub async fn submit_review(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    input: ReviewInput,
) -> Result<review::Model, DomainError> {
    validate_rating(input.rating)?;
    validate_review_text(&input.review_text)?;

    book::Entity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    let existing = review::Entity::find()
        .filter(review::Column::BookId.eq(book_id))
        .filter(review::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(DomainError::DuplicateReview);
    }

    let now = Utc::now().to_rfc3339();
    let insert = review::ActiveModel {
        book_id: Set(book_id),
        user_id: Set(user_id),
        rating: Set(input.rating),
        review_text: Set(input.review_text),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match insert.insert(db).await {
        Ok(model) => Ok(model),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(DomainError::DuplicateReview)
        }
        Err(e) => Err(e.into()),
    }
}

async fn find_owned(
    db: &DatabaseConnection,
    id: i32,
    acting_user: i32,
) -> Result<review::Model, DomainError> {
    let model = review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Review"))?;

    if model.user_id != acting_user {
        return Err(DomainError::Forbidden(
            "you are not authorized to modify this review".to_string(),
        ));
    }

    Ok(model)
}

pub async fn update_review(
    db: &DatabaseConnection,
    acting_user: i32,
    id: i32,
    patch: ReviewPatch,
) -> Result<review::Model, DomainError> {
    let model = find_owned(db, id, acting_user).await?;

    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }
    if let Some(text) = &patch.review_text {
        validate_review_text(text)?;
    }

    let mut active: review::ActiveModel = model.into();
    if let Some(rating) = patch.rating {
        active.rating = Set(rating);
    }
    if let Some(text) = patch.review_text {
        active.review_text = Set(text);
    }
    active.updated_at = Set(Utc::now().to_rfc3339());

    let model = active.update(db).await?;
    Ok(model)
}

pub async fn delete_review(
    db: &DatabaseConnection,
    acting_user: i32,
    id: i32,
) -> Result<(), DomainError> {
    let model = find_owned(db, id, acting_user).await?;
    model.delete(db).await?;
    Ok(())
}
