//! Media routes: hot and recent listings from the mobile API.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::{parse_count, upstream_failure, AppState};
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, HotMediaResponse};
use crate::service::RecentHotQuery;

/// Default page size
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size accepted
pub const MAX_LIMIT: u32 = 50;

/// Paging parameters shared by every media listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Offset, 0 or more (default: 0)
    pub start: Option<String>,
    /// Page size, 1 to 50 (default: 20)
    pub limit: Option<String>,
}

impl PageQuery {
    /// Validate and default the paging parameters
    pub fn resolve(&self) -> AppResult<(u32, u32)> {
        let start = match parse_count(self.start.as_deref(), "start")? {
            None => 0,
            Some(v) => u32::try_from(v).map_err(|_| AppError::validation("invalid start"))?,
        };

        let limit = match parse_count(self.limit.as_deref(), "limit")? {
            None => DEFAULT_LIMIT,
            Some(v) if v <= 0 => return Err(AppError::validation("invalid limit")),
            Some(v) if v > i64::from(MAX_LIMIT) => {
                return Err(AppError::validation("limit不能大于50"))
            }
            Some(v) => u32::try_from(v).map_err(|_| AppError::validation("invalid limit"))?,
        };

        Ok((start, limit))
    }
}

async fn listing(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
    listing: RecentHotQuery,
) -> AppResult<HttpResponse> {
    let (start, limit) = query.resolve()?;
    let result = data
        .media
        .recent_hot(listing, start, limit)
        .await
        .map_err(upstream_failure("media listing"))?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /v2/media/hot/tv - Hot TV series
#[utoipa::path(
    get,
    path = "/v2/media/hot/tv",
    tag = "media",
    params(PageQuery),
    responses(
        (status = 200, description = "Hot TV series", body = HotMediaResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn hot_tv(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    listing(data, query, RecentHotQuery::HOT_TV).await
}

/// GET /v2/media/hot/movie - Hot movies
#[utoipa::path(
    get,
    path = "/v2/media/hot/movie",
    tag = "media",
    params(PageQuery),
    responses(
        (status = 200, description = "Hot movies", body = HotMediaResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn hot_movie(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    listing(data, query, RecentHotQuery::HOT_MOVIE).await
}

/// GET /v2/media/latest/movie - Latest movies
#[utoipa::path(
    get,
    path = "/v2/media/latest/movie",
    tag = "media",
    params(PageQuery),
    responses(
        (status = 200, description = "Latest movies", body = HotMediaResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn latest_movie(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    listing(data, query, RecentHotQuery::LATEST_MOVIE).await
}

/// GET /v2/media/high-rating/movie - Highest rated movies
#[utoipa::path(
    get,
    path = "/v2/media/high-rating/movie",
    tag = "media",
    params(PageQuery),
    responses(
        (status = 200, description = "Highest rated movies", body = HotMediaResponse),
        (status = 400, description = "Invalid paging parameters", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn high_rating_movie(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    listing(data, query, RecentHotQuery::HIGH_RATING_MOVIE).await
}
