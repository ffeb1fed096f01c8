//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Referenced entity does not exist; carries the entity kind ("book",
    /// "review", "user")
    NotFound(&'static str),
    /// Acting user is not the entity's owner
    Forbidden(String),
    /// Field-level validation failure, detected before any write
    Validation { field: &'static str, message: String },
    /// A review for this (book, user) pair already exists
    DuplicateReview,
    /// Cascade cleanup did not complete; distinct from a plain store fault so
    /// partial cleanup is never silently swallowed
    Cascade(String),
    /// Database/persistence error
    Database(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DomainError::Validation { field, message } => {
                write!(f, "Validation error on '{}': {}", field, message)
            }
            DomainError::DuplicateReview => write!(f, "You have already reviewed this book"),
            DomainError::Cascade(msg) => write!(f, "Cascade delete incomplete: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in the services layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
