use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bookcircle::{api, auth, db, models};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a test user, returning (id, bearer token)
async fn create_test_user(db: &DatabaseConnection, name: &str, email: &str) -> (i32, String) {
    let now = chrono::Utc::now().to_rfc3339();
    let user = models::user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("hash".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = user.insert(db).await.expect("Failed to create user");
    let token = auth::create_jwt(model.id, &model.name).expect("Failed to create token");
    (model.id, token)
}

fn json_request(uri: &str, method: &str, token: Option<&str>, payload: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn test_app(db: DatabaseConnection) -> Router {
    api::api_router(db)
}

#[tokio::test]
async fn test_get_book_not_found() {
    let db = setup_test_db().await;
    let app = test_app(db);

    let req = Request::builder()
        .uri("/books/999")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_book_requires_auth() {
    let db = setup_test_db().await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "title": "Unauthenticated",
        "author": "Nobody",
        "description": "This should never be stored",
        "genre": "Fiction",
        "publishedYear": 2000
    });

    let response = app
        .oneshot(json_request("/books", "POST", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_book_field_level_validation() {
    let db = setup_test_db().await;
    let (_id, token) = create_test_user(&db, "Writer", "writer@example.com").await;
    let app = test_app(db);

    // Description too short
    let payload = serde_json::json!({
        "title": "Short",
        "author": "Author",
        "description": "tiny",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "description");

    // Missing title entirely
    let payload = serde_json::json!({
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "title");

    // Published year out of range
    let payload = serde_json::json!({
        "title": "Time Traveller",
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 999
    });
    let response = app
        .oneshot(json_request("/books", "POST", Some(&token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "publishedYear");
}

#[tokio::test]
async fn test_create_book_invalid_json() {
    let db = setup_test_db().await;
    let (_id, token) = create_test_user(&db, "Writer", "writer@example.com").await;
    let app = test_app(db);

    let req = Request::builder()
        .uri("/books")
        .method("POST")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("invalid json"))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    // Axum's Json extractor returns 400 for malformed JSON
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_book_forbidden_for_non_owner() {
    let db = setup_test_db().await;
    let (_owner_id, owner_token) = create_test_user(&db, "Owner", "owner@example.com").await;
    let (_other_id, other_token) = create_test_user(&db, "Other", "other@example.com").await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "title": "Owned Book",
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&owner_token), &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let book_id = json["book"]["id"].as_i64().unwrap();

    let update = serde_json::json!({ "title": "Hijacked" });
    let response = app
        .clone()
        .oneshot(json_request(
            &format!("/books/{}", book_id),
            "PUT",
            Some(&other_token),
            &update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Entity unchanged
    let req = Request::builder()
        .uri(format!("/books/{}", book_id))
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["book"]["title"], "Owned Book");
}

#[tokio::test]
async fn test_duplicate_review_is_conflict() {
    let db = setup_test_db().await;
    let (_owner_id, owner_token) = create_test_user(&db, "Owner", "owner@example.com").await;
    let (_reviewer_id, reviewer_token) =
        create_test_user(&db, "Reviewer", "reviewer@example.com").await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "title": "Conflict Book",
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&owner_token), &payload))
        .await
        .unwrap();
    let json = body_json(response).await;
    let book_id = json["book"]["id"].as_i64().unwrap();

    let review = serde_json::json!({ "rating": 5, "reviewText": "Loved every page" });
    let response = app
        .clone()
        .oneshot(json_request(
            &format!("/reviews/{}", book_id),
            "POST",
            Some(&reviewer_token),
            &review,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            &format!("/reviews/{}", book_id),
            "POST",
            Some(&reviewer_token),
            &review,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "You have already reviewed this book");
}

#[tokio::test]
async fn test_review_invalid_rating_is_field_error() {
    let db = setup_test_db().await;
    let (_owner_id, owner_token) = create_test_user(&db, "Owner", "owner@example.com").await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "title": "Rated Book",
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&owner_token), &payload))
        .await
        .unwrap();
    let json = body_json(response).await;
    let book_id = json["book"]["id"].as_i64().unwrap();

    let review = serde_json::json!({ "rating": 6, "reviewText": "Off the charts" });
    let response = app
        .oneshot(json_request(
            &format!("/reviews/{}", book_id),
            "POST",
            Some(&owner_token),
            &review,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["field"], "rating");
}

#[tokio::test]
async fn test_delete_book_cascades_via_api() {
    let db = setup_test_db().await;
    let (_owner_id, owner_token) = create_test_user(&db, "Owner", "owner@example.com").await;
    let (_reviewer_id, reviewer_token) =
        create_test_user(&db, "Reviewer", "reviewer@example.com").await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "title": "Doomed Book",
        "author": "Author",
        "description": "A sufficiently long description",
        "genre": "Fiction",
        "publishedYear": 2000
    });
    let response = app
        .clone()
        .oneshot(json_request("/books", "POST", Some(&owner_token), &payload))
        .await
        .unwrap();
    let json = body_json(response).await;
    let book_id = json["book"]["id"].as_i64().unwrap();

    let review = serde_json::json!({ "rating": 4, "reviewText": "Gone too soon" });
    let response = app
        .clone()
        .oneshot(json_request(
            &format!("/reviews/{}", book_id),
            "POST",
            Some(&reviewer_token),
            &review,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = Request::builder()
        .uri(format!("/books/{}", book_id))
        .method("DELETE")
        .header(header::AUTHORIZATION, format!("Bearer {}", owner_token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .uri(format!("/books/{}", book_id))
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let db = setup_test_db().await;
    let app = test_app(db);

    let payload = serde_json::json!({
        "name": "New User",
        "email": "new@example.com",
        "password": "password123"
    });
    let response = app
        .clone()
        .oneshot(json_request("/auth/register", "POST", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["token"].as_str().is_some());
    assert_eq!(json["user"]["email"], "new@example.com");

    // Registering the same email again conflicts at the store.
    let response = app
        .clone()
        .oneshot(json_request("/auth/register", "POST", None, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let login = serde_json::json!({ "email": "new@example.com", "password": "password123" });
    let response = app
        .clone()
        .oneshot(json_request("/auth/login", "POST", None, &login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["token"].as_str().unwrap().to_string();

    let bad_login = serde_json::json!({ "email": "new@example.com", "password": "wrong" });
    let response = app
        .clone()
        .oneshot(json_request("/auth/login", "POST", None, &bad_login))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/auth/me")
        .method("GET")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["name"], "New User");
}
