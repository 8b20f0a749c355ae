//! Seed the `Book` collection with the sample catalog.

use book_service::{
    config::BookConfig,
    models::book::sample_books,
    services::{BookStore, MongoDb},
};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    let config = BookConfig::from_env()?;
    init_tracing("populate-books", &config.log_level, None);

    let db = MongoDb::connect(&config.mongodb).await?;
    let inserted = db.insert_many(sample_books()).await?;

    tracing::info!(inserted, database = %config.mongodb.database, "Sample books inserted");
    Ok(())
}
