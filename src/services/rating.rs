//! Rating Aggregator - derives a book's rating figures from its live reviews
//!
//! Nothing here is cached or stored; every call recomputes from the review
//! set, so readers can never observe a stale aggregate.

use std::collections::BTreeMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::models::review;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Arithmetic mean of all ratings, 0 when the book has no reviews
    pub average_rating: f64,
    pub total_reviews: u64,
    /// Counts per rating value; all five buckets are always present
    pub rating_distribution: BTreeMap<u8, u64>,
}

pub async fn summarize(db: &DatabaseConnection, book_id: i32) -> Result<RatingSummary, DomainError> {
    let reviews = review::Entity::find()
        .filter(review::Column::BookId.eq(book_id))
        .all(db)
        .await?;

    let mut distribution: BTreeMap<u8, u64> = (1..=5).map(|bucket| (bucket, 0)).collect();
    let mut sum: i64 = 0;
    for review in &reviews {
        sum += review.rating as i64;
        if let Some(count) = distribution.get_mut(&(review.rating as u8)) {
            *count += 1;
        }
    }

    let total = reviews.len() as u64;
    let average = if total == 0 {
        0.0
    } else {
        sum as f64 / total as f64
    };

    Ok(RatingSummary {
        average_rating: average,
        total_reviews: total,
        rating_distribution: distribution,
    })
}
