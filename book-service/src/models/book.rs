//! Catalog entries stored in the `Book` collection.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub author: String,
    /// Free-form, usually `YYYY-MM-DD`; only the leading year is ever interpreted.
    pub published_date: String,
    pub genre: String,
    pub price: f64,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        published_date: impl Into<String>,
        genre: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            published_date: published_date.into(),
            genre: genre.into(),
            price,
        }
    }

    /// Whether `published_date` starts with the decimal rendering of `year`.
    pub fn published_in(&self, year: u32) -> bool {
        self.published_date.starts_with(&year.to_string())
    }
}

/// Sample records loaded by the `populate-books` command.
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new(
            "Clean Code",
            "Robert C. Martin",
            "2008-08-01",
            "Software Engineering",
            30.5,
        ),
        Book::new(
            "The Pragmatic Programmer",
            "Andrew Hunt",
            "1999-10-30",
            "Programming",
            40.0,
        ),
        Book::new(
            "Introduction to Algorithms",
            "Thomas H. Cormen",
            "2009-07-31",
            "Algorithms",
            70.0,
        ),
        Book::new(
            "Design Patterns",
            "Erich Gamma",
            "1994-11-10",
            "Software Design",
            50.0,
        ),
        Book::new(
            "The Mythical Man-Month",
            "Frederick P. Brooks Jr.",
            "1975-01-01",
            "Software Project Management",
            25.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_in_matches_prefix() {
        let book = Book::new("t", "a", "2008-08-01", "g", 1.0);
        assert!(book.published_in(2008));
        assert!(!book.published_in(2009));
        // Prefix semantics, same as the `^<year>` store query
        assert!(book.published_in(200));
    }

    #[test]
    fn test_sample_books_have_no_ids() {
        let books = sample_books();
        assert_eq!(books.len(), 5);
        assert!(books.iter().all(|b| b.id.is_none()));
    }
}
