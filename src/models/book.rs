use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub published_year: i32,
    pub added_by: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for catalog responses. Wire names are camelCase to match the catalog
// query surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub genre: String,
    pub published_year: i32,
    pub added_by: i32,
    pub created_at: String,
    pub updated_at: String,
    /// Derived from live reviews at read time; 0 when the book has none.
    pub average_rating: f64,
}

impl BookSummary {
    pub fn from_model(model: Model, average_rating: f64) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            description: model.description,
            genre: model.genre,
            published_year: model.published_year,
            added_by: model.added_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            average_rating,
        }
    }
}
