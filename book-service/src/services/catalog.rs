//! Book catalog operations over a `BookStore`.

use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::{
    dtos::books::{BookRequest, PageQuery},
    models::Book,
    services::{BookStore, ServiceError},
};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Resolved `?page=&page_size=` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// `page` must be a positive integer. An unusable `page_size` falls back
    /// to the default; an oversized one is capped.
    pub fn parse(query: &PageQuery) -> Result<Self, ServiceError> {
        let page = match query.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page > 0 => page,
                _ => return Err(ServiceError::InvalidPage),
            },
        };

        let page_size = query
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self { page, page_size })
    }
}

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// One page of books in store order. Page 1 of an empty catalog is an
    /// empty list; any other page past the end is `InvalidPage`.
    pub async fn list_page(&self, query: &PageQuery) -> Result<Vec<Book>, ServiceError> {
        let request = PageRequest::parse(query)?;

        let total = self.books.count().await?;
        let pages = total.div_ceil(request.page_size).max(1);
        if request.page > pages {
            return Err(ServiceError::InvalidPage);
        }

        let skip = (request.page - 1) * request.page_size;
        Ok(self.books.list(skip, request.page_size).await?)
    }

    pub async fn create(&self, req: BookRequest) -> Result<Book, ServiceError> {
        let book = self.books.insert(Book::from(req)).await?;
        tracing::info!(book_id = ?book.id, "Book created");
        Ok(book)
    }

    pub async fn get(&self, id: &ObjectId) -> Result<Book, ServiceError> {
        self.books
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::BookNotFound)
    }

    /// Full replace of every field but the id.
    pub async fn update(&self, id: &ObjectId, req: BookRequest) -> Result<Book, ServiceError> {
        let mut book = Book::from(req);
        if !self.books.replace(id, &book).await? {
            return Err(ServiceError::BookNotFound);
        }
        book.id = Some(*id);
        tracing::info!(book_id = %id, "Book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), ServiceError> {
        if !self.books.delete(id).await? {
            return Err(ServiceError::BookNotFound);
        }
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    pub async fn average_price(&self, year: u32) -> Result<f64, ServiceError> {
        self.books
            .average_price_for_year(year)
            .await?
            .ok_or(ServiceError::NoBooksForYear)
    }
}
