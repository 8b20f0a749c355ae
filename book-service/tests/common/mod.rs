//! Shared setup for book-service integration tests. Routers are built over
//! `InMemoryStore`, so no MongoDB instance is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use book_service::{
    build_router,
    config::{
        BookConfig, Environment, JwtConfig, MongoConfig, SecurityConfig, SwaggerConfig,
        SwaggerMode,
    },
    services::InMemoryStore,
    AppState,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-signing-key";

pub fn test_config() -> BookConfig {
    BookConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "book-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "books_test".to_string(),
            timeout_seconds: 5,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: 1,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Public,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: BookConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(config, store.clone(), store)
            .expect("Failed to build application state");
        Self::with_state(state)
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    /// Send a request and return the status with the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/users/",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/login/",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Register and log in a fresh user, returning its access token.
    pub async fn access_token(&self) -> String {
        let (status, _) = self.register("reader@example.com", "s3cret").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login("reader@example.com", "s3cret").await;
        assert_eq!(status, StatusCode::OK);
        body["access"].as_str().unwrap().to_string()
    }
}

pub fn book_json(title: &str, published_date: &str, price: f64) -> Value {
    json!({
        "title": title,
        "author": "Test Author",
        "published_date": published_date,
        "genre": "Testing",
        "price": price,
    })
}
