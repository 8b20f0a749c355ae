use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::{
    dtos::books::{AveragePriceResponse, BookRequest, BookResponse, PageQuery},
    middleware::AuthUser,
    utils::{ApiPath, ApiQuery, ValidatedJson},
    AppState,
};

fn parse_book_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid ID format")))
}

/// List books, one page at a time
#[utoipa::path(
    get,
    path = "/books/",
    params(PageQuery),
    responses(
        (status = 200, description = "Requested page of books", body = [BookResponse]),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Invalid page", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let books = state.catalog.list_page(&query).await?;
    let body: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();
    Ok(Json(body))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books/",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Validation error", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let book = state.catalog.create(req).await?;
    tracing::info!(user_id = %user.id, book_id = ?book.id, "Book added to catalog");
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{id}/",
    params(("id" = String, Path, description = "Book ObjectId (hex)")),
    responses(
        (status = 200, description = "Book found", body = BookResponse),
        (status = 400, description = "Invalid ID format", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_book_id(&id)?;
    let book = state.catalog.get(&id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// Replace every field of a book
#[utoipa::path(
    put,
    path = "/books/{id}/",
    params(("id" = String, Path, description = "Book ObjectId (hex)")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid ID format or validation error", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<String>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_book_id(&id)?;
    let book = state.catalog.update(&id, req).await?;
    tracing::info!(user_id = %user.id, book_id = %id, "Book replaced");
    Ok(Json(BookResponse::from(book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    params(("id" = String, Path, description = "Book ObjectId (hex)")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Invalid ID format", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_book_id(&id)?;
    state.catalog.delete(&id).await?;
    tracing::info!(user_id = %user.id, book_id = %id, "Book removed from catalog");
    Ok(StatusCode::NO_CONTENT)
}

/// Average price of the books published in a year
#[utoipa::path(
    get,
    path = "/books/average-price/{year}/",
    params(("year" = u32, Path, description = "Publication year, e.g. 2008")),
    responses(
        (status = 200, description = "Average price", body = AveragePriceResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "No books found for the given year", body = crate::dtos::ErrorResponse)
    ),
    tag = "Books",
    security(("bearer_auth" = []))
)]
pub async fn average_price(
    State(state): State<AppState>,
    ApiPath(year): ApiPath<String>,
) -> Result<impl IntoResponse, AppError> {
    // Only all-digit segments name a year; anything else is an unknown route.
    let year = year
        .parse::<u32>()
        .ok()
        .filter(|_| year.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Not found.")))?;

    let average_price = state.catalog.average_price(year).await?;
    Ok(Json(AveragePriceResponse { average_price }))
}
