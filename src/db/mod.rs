//! Persistence layer: domain models, repository interfaces, and their
//! Postgres and in-memory implementations.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use models::{RefreshToken, User, UserInfo};
pub use repository::{RefreshTokenRepository, UserRepository};
