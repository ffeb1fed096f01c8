use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserSummary;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub review_text: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for book detail responses, decorated with the reviewer summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub review_text: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<UserSummary>,
}

impl ReviewDto {
    pub fn from_model(model: Model, reviewer: Option<UserSummary>) -> Self {
        Self {
            id: model.id,
            book_id: model.book_id,
            user_id: model.user_id,
            rating: model.rating,
            review_text: model.review_text,
            created_at: model.created_at,
            updated_at: model.updated_at,
            reviewer,
        }
    }
}
