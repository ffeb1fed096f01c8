use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{create_jwt, hash_password, verify_password, Claims};
use crate::models::user::{self, UserSummary};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn field_error(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message, "field": field })),
    )
        .into_response()
}

pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let name = req.name.unwrap_or_default().trim().to_string();
    let email = req.email.unwrap_or_default().trim().to_lowercase();
    let password = req.password.unwrap_or_default();

    if name.is_empty() {
        return field_error("name", "must not be empty");
    }
    if email.is_empty() || !email.contains('@') {
        return field_error("email", "must be a valid email address");
    }
    if password.len() < 6 {
        return field_error("password", "must be at least 6 characters");
    }

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response();
        }
    };

    let now = chrono::Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        name: Set(name),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_user.insert(&db).await {
        Ok(model) => match create_jwt(model.id, &model.name) {
            Ok(token) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "User registered successfully",
                    "token": token,
                    "user": UserSummary::from(model)
                })),
            )
                .into_response(),
            Err(e) => {
                tracing::error!("token creation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        },
        // Email uniqueness is enforced by the store.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Email is already registered", "field": "email" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let email = req.email.trim().to_lowercase();

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&db)
        .await;

    let model = match found {
        Ok(Some(model)) => model,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid email or password" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    if !verify_password(&req.password, &model.password_hash).unwrap_or(false) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        )
            .into_response();
    }

    match create_jwt(model.id, &model.name) {
        Ok(token) => (
            StatusCode::OK,
            Json(json!({
                "message": "Login successful",
                "token": token,
                "user": UserSummary::from(model)
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("token creation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

pub async fn get_me(claims: Claims, State(db): State<DatabaseConnection>) -> Response {
    match user::Entity::find_by_id(claims.user_id()).one(&db).await {
        Ok(Some(model)) => {
            (StatusCode::OK, Json(json!({ "user": UserSummary::from(model) }))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "User not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
