mod common;

use axum::http::{Method, StatusCode};
use book_service::models::{book::sample_books, Book, Identity};
use chrono::{Duration, Utc};
use common::{book_json, TestApp};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

#[tokio::test]
async fn test_end_to_end_flow() {
    let app = TestApp::new();

    let (status, _) = app.register("a@x.com", "pw").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, tokens) = app.login("a@x.com", "pw").await;
    assert_eq!(status, StatusCode::OK);
    let access = tokens["access"].as_str().unwrap();

    let (status, body) = app.send(Method::GET, "/books/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication credentials were not provided.");

    let (status, body) = app.send(Method::GET, "/books/", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app
        .send(Method::GET, "/books/average-price/2099/", Some(access), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No books found for the given year.");
}

#[tokio::test]
async fn test_guard_rejections() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/books/", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Given token not valid for any token type");

    let token = app.access_token().await;
    let identity = app.state.jwt.verify_access(&token).unwrap();
    let expired = app
        .state
        .jwt
        .issue_pair_at(&identity, Utc::now() - Duration::hours(1))
        .unwrap();
    let (status, body) = app
        .send(Method::GET, "/books/", Some(&expired.access), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has expired");

    let ghost = app
        .state
        .jwt
        .issue_pair(&Identity {
            id: ObjectId::new().to_hex(),
            email: "ghost@x.com".to_string(),
        })
        .unwrap();
    let (status, body) = app
        .send(Method::GET, "/books/", Some(&ghost.access), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_book_crud() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/books/",
            Some(&token),
            Some(book_json("Clean Code", "2008-08-01", 30.5)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Clean Code");

    let uri = format!("/books/{}/", id);
    let (status, fetched) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = app
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(book_json("Clean Coder", "2011-05-13", 25.0)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["_id"], id.as_str());
    assert_eq!(updated["title"], "Clean Coder");

    let (_, fetched) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(fetched["price"], 25.0);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");

    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(book_json("Ghost", "2000", 1.0)),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_id_format() {
    let app = TestApp::new();
    let token = app.access_token().await;

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = app
            .send(method, "/books/not-an-id/", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid ID format");
    }
}

#[tokio::test]
async fn test_create_book_validation() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/books/",
            Some(&token),
            Some(book_json("Title", "2008-08-01-extra", 10.0)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["published_date"].is_array());

    let (status, _) = app
        .send(
            Method::POST,
            "/books/",
            Some(&token),
            Some(json!({ "title": "No price", "author": "a", "published_date": "2000", "genre": "g" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pagination() {
    let app = TestApp::new();
    let token = app.access_token().await;
    let books = (0..15)
        .map(|i| book(&format!("Book {}", i), "2001-01-01", 10.0))
        .collect();
    app.state.books.insert_many(books).await.unwrap();

    let (status, body) = app.send(Method::GET, "/books/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);
    assert_eq!(body[0]["title"], "Book 0");

    let (_, body) = app
        .send(Method::GET, "/books/?page=2", Some(&token), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["title"], "Book 10");

    let (_, body) = app
        .send(Method::GET, "/books/?page=3&page_size=4", Some(&token), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[0]["title"], "Book 8");

    for uri in ["/books/?page=3", "/books/?page=0", "/books/?page=abc"] {
        let (status, body) = app.send(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body["error"], "Invalid page.");
    }
}

#[tokio::test]
async fn test_average_price_by_year() {
    let app = TestApp::new();
    let token = app.access_token().await;
    app.state.books.insert_many(sample_books()).await.unwrap();
    app.state
        .books
        .insert(book("Refactoring", "2008-03-01", 50.5))
        .await
        .unwrap();

    let (status, body) = app
        .send(Method::GET, "/books/average-price/2008/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_price"], 40.5);

    let (status, _) = app
        .send(Method::GET, "/books/average-price/abc/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app
        .send(Method::GET, "/.well-known/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/{id}/"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

fn book(title: &str, published_date: &str, price: f64) -> Book {
    Book::new(title, "Author", published_date, "Genre", price)
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found.");
}

#[tokio::test]
async fn test_malformed_query_and_path_are_json_400() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let (status, body) = app
        .send(Method::GET, "/books/?page=1&page=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .send(Method::GET, "/books/%FF/", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unsupported_method_is_json_405() {
    let app = TestApp::new();
    let token = app.access_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/books/65a1b2c3d4e5f60718293a4b/",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed.");

    let (status, body) = app.send(Method::GET, "/login/", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed.");
}
