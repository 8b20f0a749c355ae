//! Business logic and persistence for book-service.

mod auth;
pub mod catalog;
mod database;
pub mod error;
pub mod jwt;
mod memory;
pub mod store;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use database::{MongoDb, BOOKS_COLLECTION, USERS_COLLECTION};
pub use error::ServiceError;
pub use jwt::{Claims, JwtService, TokenError, TokenPair, TokenType};
pub use memory::InMemoryStore;
pub use store::{BookStore, UserStore};
