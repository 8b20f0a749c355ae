//! MongoDB access for the `User` and `Book` collections.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::{ClientOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::time::Duration;

use crate::config::MongoConfig;
use crate::models::{Book, User};
use crate::services::store::{BookStore, UserStore};

pub const USERS_COLLECTION: &str = "User";
pub const BOOKS_COLLECTION: &str = "Book";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Invalid MONGODB_URI: {}", e))
        })?;
        let timeout = Duration::from_secs(config.timeout_seconds);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("book-service".to_string());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);
        tracing::info!(database = %config.database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    /// Lookup indexes only. `User.email` is deliberately not unique: the
    /// duplicate check stays an application-level pre-check.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for book-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_lookup".to_string())
                    .build(),
            )
            .build();

        self.users()
            .create_index(email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on User collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on User.email");

        let published_index = IndexModel::builder()
            .keys(doc! { "published_date": 1 })
            .options(
                IndexOptions::builder()
                    .name("published_date_lookup".to_string())
                    .build(),
            )
            .build();

        self.books()
            .create_index(published_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create published_date index on Book collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on Book.published_date");

        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection(USERS_COLLECTION)
    }

    pub fn books(&self) -> Collection<Book> {
        self.db.collection(BOOKS_COLLECTION)
    }
}

fn book_fields(book: &Book) -> Result<Document, AppError> {
    let fields = Book {
        id: None,
        ..book.clone()
    };
    bson::to_document(&fields)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode book: {}", e)))
}

#[async_trait]
impl UserStore for MongoDb {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user by email: {}", e);
                AppError::from(e)
            })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %id, "Failed to look up user by id: {}", e);
                AppError::from(e)
            })
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let count = self
            .users()
            .count_documents(doc! { "email": email }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check for existing email: {}", e);
                AppError::from(e)
            })?;
        Ok(count > 0)
    }

    async fn insert(&self, mut user: User) -> Result<ObjectId, AppError> {
        let id = *user.id.get_or_insert_with(ObjectId::new);
        self.users().insert_one(&user, None).await.map_err(|e| {
            tracing::error!(user_id = %id, "Failed to insert user: {}", e);
            AppError::from(e)
        })?;
        Ok(id)
    }
}

#[async_trait]
impl BookStore for MongoDb {
    async fn count(&self) -> Result<u64, AppError> {
        self.books()
            .count_documents(doc! {}, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count books: {}", e);
                AppError::from(e)
            })
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Book>, AppError> {
        let options = FindOptions::builder()
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let cursor = self.books().find(doc! {}, options).await.map_err(|e| {
            tracing::error!("Failed to list books: {}", e);
            AppError::from(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to read book cursor: {}", e);
            AppError::from(e)
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError> {
        self.books()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(book_id = %id, "Failed to look up book: {}", e);
                AppError::from(e)
            })
    }

    async fn insert(&self, mut book: Book) -> Result<Book, AppError> {
        let id = *book.id.get_or_insert_with(ObjectId::new);
        self.books().insert_one(&book, None).await.map_err(|e| {
            tracing::error!(book_id = %id, "Failed to insert book: {}", e);
            AppError::from(e)
        })?;
        Ok(book)
    }

    async fn insert_many(&self, books: Vec<Book>) -> Result<usize, AppError> {
        if books.is_empty() {
            return Ok(0);
        }

        let books: Vec<Book> = books
            .into_iter()
            .map(|mut book| {
                book.id.get_or_insert_with(ObjectId::new);
                book
            })
            .collect();

        let result = self.books().insert_many(&books, None).await.map_err(|e| {
            tracing::error!("Failed to insert books: {}", e);
            AppError::from(e)
        })?;
        Ok(result.inserted_ids.len())
    }

    async fn replace(&self, id: &ObjectId, book: &Book) -> Result<bool, AppError> {
        let fields = book_fields(book)?;
        let result = self
            .books()
            .update_one(doc! { "_id": *id }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| {
                tracing::error!(book_id = %id, "Failed to update book: {}", e);
                AppError::from(e)
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .books()
            .delete_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(book_id = %id, "Failed to delete book: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn average_price_for_year(&self, year: u32) -> Result<Option<f64>, AppError> {
        let pipeline = vec![
            doc! { "$match": { "published_date": { "$regex": format!("^{}", year) } } },
            doc! { "$group": { "_id": null, "average_price": { "$avg": "$price" } } },
        ];

        let mut cursor = self.books().aggregate(pipeline, None).await.map_err(|e| {
            tracing::error!(year, "Failed to aggregate average price: {}", e);
            AppError::from(e)
        })?;

        let group = cursor.try_next().await.map_err(|e| {
            tracing::error!(year, "Failed to read aggregation cursor: {}", e);
            AppError::from(e)
        })?;

        // `$avg` yields null when no matched book has a numeric price
        Ok(group.and_then(|doc| doc.get_f64("average_price").ok()))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
