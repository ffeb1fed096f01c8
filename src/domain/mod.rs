//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM types leak out,
//! no Axum). Only domain error types; HTTP mapping lives in the api layer.

pub mod errors;

pub use errors::DomainError;
