pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, panic::panic_response,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{openapi::security::SecurityScheme, Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{BookConfig, Environment, SecurityConfig, SwaggerMode};
use crate::services::{AuthService, BookStore, CatalogService, JwtService, UserStore};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::metrics::metrics,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::register,
        handlers::books::list_books,
        handlers::books::create_book,
        handlers::books::get_book,
        handlers::books::update_book,
        handlers::books::delete_book,
        handlers::books::average_price,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::LoginRequest,
            dtos::auth::RegisterRequest,
            dtos::auth::RefreshRequest,
            dtos::auth::TokenPairResponse,
            dtos::auth::AccessTokenResponse,
            dtos::books::BookRequest,
            dtos::books::BookResponse,
            dtos::books::AveragePriceResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "Books", description = "Book catalog"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: BookConfig,
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
    pub jwt: JwtService,
    pub auth_service: AuthService,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wire the services over the given stores. The signing key is loaded
    /// once here and shared by every request.
    pub fn new(
        config: BookConfig,
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
    ) -> Result<Self, AppError> {
        let jwt = JwtService::new(&config.jwt).map_err(AppError::ConfigError)?;
        let auth_service = AuthService::new(users.clone(), jwt.clone());
        let catalog = CatalogService::new(books.clone());

        Ok(Self {
            config,
            users,
            books,
            jwt,
            auth_service,
            catalog,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let book_routes = Router::new()
        .route(
            "/books/",
            get(handlers::books::list_books)
                .post(handlers::books::create_book)
                .fallback(method_not_allowed),
        )
        .route(
            "/books/:id/",
            get(handlers::books::get_book)
                .put(handlers::books::update_book)
                .delete(handlers::books::delete_book)
                .fallback(method_not_allowed),
        )
        .route(
            "/books/average-price/:year/",
            get(handlers::books::average_price).fallback(method_not_allowed),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health_check).fallback(method_not_allowed))
        .route(
            "/metrics",
            get(handlers::metrics::metrics).fallback(method_not_allowed),
        );

    let swagger_enabled = match state.config.environment {
        Environment::Dev => true,
        Environment::Prod => state.config.swagger.enabled == SwaggerMode::Public,
    };

    if swagger_enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        // The document stays reachable for programmatic clients
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    app.route(
        "/login/",
        post(handlers::auth::login).fallback(method_not_allowed),
    )
    .route(
        "/token/refresh/",
        post(handlers::auth::refresh).fallback(method_not_allowed),
    )
    .route(
        "/users/",
        post(handlers::auth::register).fallback(method_not_allowed),
    )
    .merge(book_routes)
    .fallback(not_found)
    .with_state(state.clone())
    .layer(CatchPanicLayer::custom(panic_response))
    .layer(from_fn(metrics_middleware))
    .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
    .layer(from_fn(request_id_middleware))
    .layer(from_fn(security_headers_middleware))
    .layer(cors_layer(&state.config.security))
}

async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not found."))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let allow_origin = if security.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = security
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(e) => {
                    tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Document store unreachable", body = dtos::ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.books.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "MongoDB health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "mongodb": "up"
        }
    })))
}
