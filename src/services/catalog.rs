//! Catalog Query Engine - answers "books matching X, sorted by Y, page Z"
//!
//! Sorting dispatches on the sort key: stored book fields sort at the store
//! and only the returned page is decorated with average ratings, while the
//! derived `averageRating` key runs a store-side join/aggregation so the
//! full candidate set is never loaded into application memory.

use futures::future::join_all;
use sea_orm::sea_query::{Alias, Expr, Func, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    Order, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::models::{book, review, BookSummary};
use crate::services::rating;

/// Catalog page size; `CatalogQuery.page_size` lets tests override it.
pub const BOOKS_PER_PAGE: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    PublishedYear,
    Title,
    Author,
    /// Derived value; forces the aggregate-sort strategy
    AverageRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogQuery {
    /// 1-based page number
    pub page: u64,
    pub page_size: u64,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub sort_by: SortKey,
    pub sort_order: SortDirection,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: BOOKS_PER_PAGE,
            search: None,
            genre: None,
            sort_by: SortKey::default(),
            sort_order: SortDirection::default(),
        }
    }
}

impl CatalogQuery {
    /// Conjunctive filter; absent parameters contribute no clause.
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(search) = &self.search
            && !search.is_empty()
        {
            condition = condition.add(
                Condition::any()
                    .add(book::Column::Title.contains(search))
                    .add(book::Column::Author.contains(search)),
            );
        }

        if let Some(genre) = &self.genre
            && !genre.is_empty()
        {
            condition = condition.add(book::Column::Genre.eq(genre.as_str()));
        }

        condition
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_books: u64,
    pub books_per_page: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogPage {
    pub books: Vec<BookSummary>,
    pub pagination: Pagination,
}

pub async fn query_catalog(
    db: &DatabaseConnection,
    query: &CatalogQuery,
) -> Result<CatalogPage, DomainError> {
    let page = query.page.max(1);
    let page_size = query.page_size.max(1);
    let condition = query.condition();

    // Total count comes from the filter alone, independent of sort strategy.
    let total = book::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let total_pages = total.div_ceil(page_size);

    let books = match query.sort_by {
        SortKey::AverageRating => {
            rating_sorted_page(db, condition, query.sort_order.order(), page, page_size).await?
        }
        stored => {
            field_sorted_page(
                db,
                condition,
                stored,
                query.sort_order.order(),
                page,
                page_size,
            )
            .await?
        }
    };

    Ok(CatalogPage {
        books,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_books: total,
            books_per_page: page_size,
        },
    })
}

/// Direct-field strategy: sort/skip/limit at the store, then decorate exactly
/// the page-sized result set with average ratings.
async fn field_sorted_page(
    db: &DatabaseConnection,
    condition: Condition,
    key: SortKey,
    order: Order,
    page: u64,
    page_size: u64,
) -> Result<Vec<BookSummary>, DomainError> {
    let column = match key {
        SortKey::PublishedYear => book::Column::PublishedYear,
        SortKey::Title => book::Column::Title,
        SortKey::Author => book::Column::Author,
        _ => book::Column::CreatedAt,
    };

    // A page past the end comes back empty; pagination metadata stays valid.
    let models = book::Entity::find()
        .filter(condition)
        .order_by(column, order)
        .order_by(book::Column::Id, Order::Asc)
        .paginate(db, page_size)
        .fetch_page(page - 1)
        .await?;

    let decorated = join_all(models.into_iter().map(|model| async move {
        let summary = rating::summarize(db, model.id).await?;
        Ok::<_, DomainError>(BookSummary::from_model(model, summary.average_rating))
    }))
    .await;

    decorated.into_iter().collect()
}

#[derive(Debug, FromQueryResult)]
struct RatedBookRow {
    id: i32,
    title: String,
    author: String,
    description: String,
    genre: String,
    published_year: i32,
    added_by: i32,
    created_at: String,
    updated_at: String,
    average_rating: f64,
}

/// Aggregate strategy for the derived sort key: the store joins each
/// candidate book with its reviews, averages, orders, and pages. The
/// application only ever sees one page of rows.
async fn rating_sorted_page(
    db: &DatabaseConnection,
    condition: Condition,
    order: Order,
    page: u64,
    page_size: u64,
) -> Result<Vec<BookSummary>, DomainError> {
    let mut select = Query::select();
    select
        .columns([
            (book::Entity, book::Column::Id),
            (book::Entity, book::Column::Title),
            (book::Entity, book::Column::Author),
            (book::Entity, book::Column::Description),
            (book::Entity, book::Column::Genre),
            (book::Entity, book::Column::PublishedYear),
            (book::Entity, book::Column::AddedBy),
            (book::Entity, book::Column::CreatedAt),
            (book::Entity, book::Column::UpdatedAt),
        ])
        .expr_as(
            Func::coalesce([
                SimpleExpr::from(Func::avg(Expr::col((
                    review::Entity,
                    review::Column::Rating,
                )))),
                Expr::val(0.0).into(),
            ]),
            Alias::new("average_rating"),
        )
        .from(book::Entity)
        .left_join(
            review::Entity,
            Expr::col((review::Entity, review::Column::BookId))
                .equals((book::Entity, book::Column::Id)),
        )
        .cond_where(condition)
        .group_by_col((book::Entity, book::Column::Id))
        .order_by(Alias::new("average_rating"), order)
        .order_by((book::Entity, book::Column::Id), Order::Asc)
        .limit(page_size)
        .offset((page - 1) * page_size);

    let statement = db.get_database_backend().build(&select);
    let rows = RatedBookRow::find_by_statement(statement).all(db).await?;

    Ok(rows
        .into_iter()
        .map(|row| BookSummary {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            genre: row.genre,
            published_year: row.published_year,
            added_by: row.added_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            average_rating: row.average_rating,
        })
        .collect())
}
