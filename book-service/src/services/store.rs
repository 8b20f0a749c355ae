//! Store seams. `MongoDb` backs both in production; `InMemoryStore` stands in
//! for it in tests.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::models::{Book, User};

/// Credential store access. Lookups are point reads with no side effects.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Duplicate pre-check for registration. Not atomic with `insert`: two
    /// concurrent registrations of one email can both pass it.
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Assigns a fresh `ObjectId` when the record has none.
    async fn insert(&self, user: User) -> Result<ObjectId, AppError>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn count(&self) -> Result<u64, AppError>;

    /// Books in natural (insertion) order.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Book>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError>;

    /// Returns the stored book, identifier included.
    async fn insert(&self, book: Book) -> Result<Book, AppError>;

    async fn insert_many(&self, books: Vec<Book>) -> Result<usize, AppError>;

    /// Overwrites every field but the id. `false` when no book matched.
    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<bool, AppError>;

    /// `false` when no book matched.
    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError>;

    /// Mean price of books whose `published_date` starts with `year`, or
    /// `None` when there are none.
    async fn average_price_for_year(&self, year: u32) -> Result<Option<f64>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
