//! Book routes: search and detail lookups by id or ISBN.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{parse_count, upstream_failure, AppState};
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, Book, BookSearchResult};

/// Default number of books returned by a search
pub const DEFAULT_BOOK_COUNT: i64 = 2;

/// Largest `count` a book search accepts
pub const MAX_BOOK_COUNT: i64 = 20;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookSearchQuery {
    /// Search keyword
    pub q: Option<String>,
    /// Number of results, at most 20 (default: 2)
    pub count: Option<String>,
}

/// GET /v2/book/search - Search books
#[utoipa::path(
    get,
    path = "/v2/book/search",
    tag = "book",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Search envelope", body = BookSearchResult),
        (status = 400, description = "Invalid count or count above 20", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn search_books(
    data: web::Data<AppState>,
    query: web::Query<BookSearchQuery>,
) -> AppResult<HttpResponse> {
    let keyword = query.q.as_deref().unwrap_or_default();
    if keyword.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<Book>::new()));
    }

    let count = parse_count(query.count.as_deref(), "count")?.unwrap_or(DEFAULT_BOOK_COUNT);
    if count > MAX_BOOK_COUNT {
        return Err(AppError::validation("count不能大于20"));
    }

    let result = data
        .books
        .search(keyword, count)
        .await
        .map_err(upstream_failure("book search"))?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /v2/book/id/{sid} - Book details by Douban id
#[utoipa::path(
    get,
    path = "/v2/book/id/{sid}",
    tag = "book",
    params(
        ("sid" = String, Path, description = "Douban book id")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_book_by_id(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let sid = path.into_inner();
    let book = data
        .books
        .get_book_info(&sid)
        .await
        .map_err(upstream_failure("book detail"))?;
    Ok(HttpResponse::Ok().json(book))
}

/// GET /v2/book/isbn/{isbn} - Book details by ISBN
#[utoipa::path(
    get,
    path = "/v2/book/isbn/{isbn}",
    tag = "book",
    params(
        ("isbn" = String, Path, description = "ISBN-10 or ISBN-13")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_book_by_isbn(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let isbn = path.into_inner();
    let book = data
        .books
        .get_book_info_by_isbn(&isbn)
        .await
        .map_err(upstream_failure("book by ISBN"))?;
    Ok(HttpResponse::Ok().json(book))
}
