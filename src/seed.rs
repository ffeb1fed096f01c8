use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};

use crate::auth::hash_password;
use crate::models::{book, review, user};

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if user::Entity::find().count(db).await? > 0 {
        tracing::info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    let mut user_ids = Vec::new();
    for (name, email) in [
        ("Alice Moreau", "alice@example.com"),
        ("Ben Okafor", "ben@example.com"),
        ("Carla Jensen", "carla@example.com"),
    ] {
        let password = hash_password("password123").map_err(DbErr::Custom)?;
        let model = user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(password),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        user_ids.push(model.id);
    }

    let books = [
        (
            "The Hobbit",
            "J.R.R. Tolkien",
            "Bilbo Baggins is swept into a quest to reclaim the Lonely Mountain.",
            "Fantasy",
            1937,
            user_ids[0],
        ),
        (
            "Dune",
            "Frank Herbert",
            "Paul Atreides navigates treachery and prophecy on the desert planet Arrakis.",
            "Science Fiction",
            1965,
            user_ids[1],
        ),
        (
            "Foundation",
            "Isaac Asimov",
            "Hari Seldon's psychohistory predicts the fall of the Galactic Empire.",
            "Science Fiction",
            1951,
            user_ids[1],
        ),
    ];

    let mut book_ids = Vec::new();
    for (title, author, description, genre, year, owner) in books {
        let model = book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            description: Set(description.to_owned()),
            genre: Set(genre.to_owned()),
            published_year: Set(year),
            added_by: Set(owner),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        book_ids.push(model.id);
    }

    let reviews = [
        (book_ids[0], user_ids[1], 5, "A warm, perfectly paced adventure."),
        (book_ids[0], user_ids[2], 4, "Charming from start to finish."),
        (book_ids[1], user_ids[0], 5, "Dense and rewarding worldbuilding."),
        (book_ids[2], user_ids[2], 3, "Big ideas, thin characters."),
    ];

    for (book_id, user_id, rating, text) in reviews {
        review::ActiveModel {
            book_id: Set(book_id),
            user_id: Set(user_id),
            rating: Set(rating),
            review_text: Set(text.to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
