//! Book Service - validation, ownership checks, and the review cascade
//!
//! Pure business logic without the HTTP layer; handlers call into here and
//! translate `DomainError` at the boundary.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::DomainError;
use crate::models::user::UserSummary;
use crate::models::{book, review, user, ReviewDto};
use crate::services::rating::{self, RatingSummary};

#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub published_year: i32,
}

/// Partial update; `None` fields retain their stored value.
#[derive(Debug, Default, Clone)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
}

pub struct BookDetail {
    pub book: book::Model,
    pub owner: Option<UserSummary>,
    pub rating: RatingSummary,
    /// Newest first, each carrying a reviewer summary
    pub reviews: Vec<ReviewDto>,
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title", "must not be empty"));
    }
    Ok(())
}

fn validate_author(author: &str) -> Result<(), DomainError> {
    if author.trim().is_empty() {
        return Err(DomainError::validation("author", "must not be empty"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().len() < 10 {
        return Err(DomainError::validation(
            "description",
            "must be at least 10 characters",
        ));
    }
    Ok(())
}

fn validate_genre(genre: &str) -> Result<(), DomainError> {
    if genre.trim().is_empty() {
        return Err(DomainError::validation("genre", "must not be empty"));
    }
    Ok(())
}

fn validate_published_year(year: i32) -> Result<(), DomainError> {
    let current_year = Utc::now().year();
    if year < 1000 || year > current_year {
        return Err(DomainError::validation(
            "publishedYear",
            format!("must be between 1000 and {}", current_year),
        ));
    }
    Ok(())
}

pub async fn create_book(
    db: &DatabaseConnection,
    owner_id: i32,
    input: NewBook,
) -> Result<book::Model, DomainError> {
    validate_title(&input.title)?;
    validate_author(&input.author)?;
    validate_description(&input.description)?;
    validate_genre(&input.genre)?;
    validate_published_year(input.published_year)?;

    let now = Utc::now().to_rfc3339();
    let model = book::ActiveModel {
        title: Set(input.title),
        author: Set(input.author),
        description: Set(input.description),
        genre: Set(input.genre),
        published_year: Set(input.published_year),
        added_by: Set(owner_id),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Resolve a book and enforce that `acting_user` owns it. No mutation happens
/// past this point unless the check passes.
async fn find_owned(
    db: &DatabaseConnection,
    id: i32,
    acting_user: i32,
) -> Result<book::Model, DomainError> {
    let model = book::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    if model.added_by != acting_user {
        return Err(DomainError::Forbidden(
            "you are not authorized to modify this book".to_string(),
        ));
    }

    Ok(model)
}

pub async fn update_book(
    db: &DatabaseConnection,
    acting_user: i32,
    id: i32,
    patch: BookPatch,
) -> Result<book::Model, DomainError> {
    let model = find_owned(db, id, acting_user).await?;

    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(author) = &patch.author {
        validate_author(author)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    if let Some(genre) = &patch.genre {
        validate_genre(genre)?;
    }
    if let Some(year) = patch.published_year {
        validate_published_year(year)?;
    }

    let mut active: book::ActiveModel = model.into();
    if let Some(title) = patch.title {
        active.title = Set(title);
    }
    if let Some(author) = patch.author {
        active.author = Set(author);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(genre) = patch.genre {
        active.genre = Set(genre);
    }
    if let Some(year) = patch.published_year {
        active.published_year = Set(year);
    }
    active.updated_at = Set(Utc::now().to_rfc3339());

    let model = active.update(db).await?;
    Ok(model)
}

/// Owner-initiated delete; dependent reviews are removed first, then the book,
/// inside one transaction. A failure on either step surfaces as the distinct
/// cascade error instead of a generic store fault.
pub async fn delete_book(
    db: &DatabaseConnection,
    acting_user: i32,
    id: i32,
) -> Result<(), DomainError> {
    find_owned(db, id, acting_user).await?;

    let txn = db.begin().await?;

    review::Entity::delete_many()
        .filter(review::Column::BookId.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| DomainError::Cascade(e.to_string()))?;

    book::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(|e| DomainError::Cascade(e.to_string()))?;

    txn.commit()
        .await
        .map_err(|e| DomainError::Cascade(e.to_string()))?;

    Ok(())
}

pub async fn get_book_detail(db: &DatabaseConnection, id: i32) -> Result<BookDetail, DomainError> {
    let model = book::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    let owner = user::Entity::find_by_id(model.added_by)
        .one(db)
        .await?
        .map(UserSummary::from);

    let rating = rating::summarize(db, id).await?;

    let rows = review::Entity::find()
        .find_also_related(user::Entity)
        .filter(review::Column::BookId.eq(id))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id)
        .all(db)
        .await?;

    let reviews = rows
        .into_iter()
        .map(|(review, reviewer)| ReviewDto::from_model(review, reviewer.map(UserSummary::from)))
        .collect();

    Ok(BookDetail {
        book: model,
        owner,
        rating,
        reviews,
    })
}
