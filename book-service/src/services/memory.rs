use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::{Mutex, MutexGuard};

use crate::models::{Book, User};
use crate::services::store::{BookStore, UserStore};

/// Process-local stand-in for `MongoDb`, used by tests and local runs.
pub struct InMemoryStore {
    users: Mutex<Vec<User>>,
    books: Mutex<Vec<Book>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            books: Mutex::new(Vec::new()),
        }
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<User>>, AppError> {
        self.users
            .lock()
            .map_err(|_| AppError::DatabaseError(anyhow::anyhow!("user store lock poisoned")))
    }

    fn books(&self) -> Result<MutexGuard<'_, Vec<Book>>, AppError> {
        self.books
            .lock()
            .map_err(|_| AppError::DatabaseError(anyhow::anyhow!("book store lock poisoned")))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users()?.iter().find(|u| u.id == Some(*id)).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users()?.iter().any(|u| u.email == email))
    }

    async fn insert(&self, mut user: User) -> Result<ObjectId, AppError> {
        let id = *user.id.get_or_insert_with(ObjectId::new);
        self.users()?.push(user);
        Ok(id)
    }
}

#[async_trait]
impl BookStore for InMemoryStore {
    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.books()?.len() as u64)
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Book>, AppError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self.books()?.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError> {
        Ok(self.books()?.iter().find(|b| b.id == Some(*id)).cloned())
    }

    async fn insert(&self, mut book: Book) -> Result<Book, AppError> {
        book.id.get_or_insert_with(ObjectId::new);
        self.books()?.push(book.clone());
        Ok(book)
    }

    async fn insert_many(&self, books: Vec<Book>) -> Result<usize, AppError> {
        let mut stored = self.books()?;
        let count = books.len();
        for mut book in books {
            book.id.get_or_insert_with(ObjectId::new);
            stored.push(book);
        }
        Ok(count)
    }

    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<bool, AppError> {
        let mut books = self.books()?;
        match books.iter_mut().find(|b| b.id == Some(*id)) {
            Some(existing) => {
                *existing = Book {
                    id: Some(*id),
                    ..book.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let mut books = self.books()?;
        let before = books.len();
        books.retain(|b| b.id != Some(*id));
        Ok(books.len() != before)
    }

    async fn average_price_for_year(&self, year: u32) -> Result<Option<f64>, AppError> {
        let books = self.books()?;
        let prices: Vec<f64> = books
            .iter()
            .filter(|b| b.published_in(year))
            .map(|b| b.price)
            .collect();

        if prices.is_empty() {
            return Ok(None);
        }
        Ok(Some(prices.iter().sum::<f64>() / prices.len() as f64))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
