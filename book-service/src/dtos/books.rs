use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::Book;

/// Body for create and full update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookRequest {
    #[validate(length(min = 1, max = 255, message = "Must be 1 to 255 characters."))]
    #[schema(example = "Clean Code", max_length = 255)]
    pub title: String,

    #[validate(length(min = 1, max = 255, message = "Must be 1 to 255 characters."))]
    #[schema(example = "Robert C. Martin", max_length = 255)]
    pub author: String,

    #[validate(length(min = 1, max = 10, message = "Must be 1 to 10 characters."))]
    #[schema(example = "2008-08-01", max_length = 10)]
    pub published_date: String,

    #[validate(length(min = 1, max = 100, message = "Must be 1 to 100 characters."))]
    #[schema(example = "Software Engineering", max_length = 100)]
    pub genre: String,

    #[schema(example = 30.5)]
    pub price: f64,
}

impl From<BookRequest> for Book {
    fn from(req: BookRequest) -> Self {
        Book::new(req.title, req.author, req.published_date, req.genre, req.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    /// ObjectId as 24 hex characters.
    #[serde(rename = "_id")]
    #[schema(example = "65a1b2c3d4e5f60718293a4b")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub genre: String,
    pub price: f64,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: book.title,
            author: book.author,
            published_date: book.published_date,
            genre: book.genre,
            price: book.price,
        }
    }
}

/// Raw query values; parsed by the catalog so bad input maps to "Invalid page."
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Items per page (default 10, capped at 100).
    pub page_size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AveragePriceResponse {
    #[schema(example = 25.0)]
    pub average_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn request() -> BookRequest {
        BookRequest {
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            published_date: "2008-08-01".to_string(),
            genre: "Software Engineering".to_string(),
            price: 30.5,
        }
    }

    #[test]
    fn test_field_limits() {
        assert!(request().validate().is_ok());

        let mut long_date = request();
        long_date.published_date = "2008-08-01T00".to_string();
        assert!(long_date
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("published_date"));

        let mut long_genre = request();
        long_genre.genre = "g".repeat(101);
        assert!(long_genre.validate().is_err());
    }

    #[test]
    fn test_response_renders_id_as_hex() {
        let id = ObjectId::new();
        let mut book = Book::from(request());
        book.id = Some(id);

        let json = serde_json::to_value(BookResponse::from(book)).unwrap();
        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["price"], 30.5);
    }
}
