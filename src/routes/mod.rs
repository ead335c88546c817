//! API Routes module for the Douban scraper API
//!
//! Movie, celebrity, photo and proxy handlers live here; book and media
//! listings have their own submodules.

pub mod book;
pub mod media;

use std::sync::Arc;

use actix_web::http::header::{ContentType, CONTENT_TYPE, USER_AGENT};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::config::Config;
use crate::constants::SiteUrls;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiError, Book, BookImages, BookRating, BookSearchResult, BookTag, Celebrity, CelebrityInfo,
    HotMediaItem, HotMediaOption, HotMediaPic, HotMediaRating, HotMediaResponse, HotMediaTag,
    Movie, MovieInfo, Photo,
};
use crate::scraper::{Scraper, ScraperError};
use crate::service::{BookService, MediaService, MovieService};

/// Application state shared across handlers
pub struct AppState {
    pub movies: MovieService,
    pub books: BookService,
    pub media: MediaService,
    pub config: Config,
}

impl AppState {
    /// Wire every service to one shared transport
    pub fn new(scraper: Arc<Scraper>, sites: SiteUrls, config: Config) -> Self {
        Self {
            movies: MovieService::new(scraper.clone(), sites.clone()),
            books: BookService::new(scraper.clone(), sites.clone()),
            media: MediaService::new(scraper, sites),
            config,
        }
    }
}

/// Content type used when the proxied upstream sends none
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const INDEX_HTML: &str = r#"
       接口列表：<br/>
       /movies?q={movie_name}<br/>
       /movies?q={movie_name}&type=full<br/>
       /movies/{sid}<br/>
       /movies/{sid}/celebrities<br/>
       /celebrities/{cid}<br/>
       /photo/{sid}<br/>
       /proxy?url={image_url}<br/>
       /v2/book/search?q={book_name}<br/>
       /v2/book/id/{sid}<br/>
       /v2/book/isbn/{isbn}<br/>
       /v2/media/hot/tv?start=0&limit=20<br/>
       /v2/media/hot/movie?start=0&limit=20<br/>
       /v2/media/latest/movie?start=0&limit=20<br/>
       /v2/media/high-rating/movie?start=0&limit=20<br/>
"#;

/// Log a failed upstream call and turn it into an [`AppError`]
pub(crate) fn upstream_failure(what: &'static str) -> impl FnOnce(ScraperError) -> AppError {
    move |e| {
        error!("Failed to fetch {}: {}", what, e);
        AppError::from(e)
    }
}

/// Parse an optional integer query value
pub(crate) fn parse_count(raw: Option<&str>, name: &str) -> AppResult<Option<i64>> {
    raw.map(|v| {
        v.parse::<i64>()
            .map_err(|_| AppError::validation(format!("invalid {}", name)))
    })
    .transpose()
}

/// GET / - Plain list of the available endpoints
#[utoipa::path(
    get,
    path = "/",
    tag = "index",
    responses(
        (status = 200, description = "Endpoint list", content_type = "text/html")
    )
)]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// Query parameters for movie search
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MovieSearchQuery {
    /// Search keyword
    pub q: Option<String>,
    /// Maximum number of results; 0 or absent means no limit
    pub count: Option<String>,
    /// `full` resolves every hit to its detail record
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    /// Image size hint (`m` or `l`)
    pub s: Option<String>,
}

/// GET /movies - Search movies and TV series
///
/// Clients that send no `User-Agent` and no `count` get the configured
/// default limit.
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movie",
    params(MovieSearchQuery),
    responses(
        (status = 200, description = "Search results; detail records with type=full", body = Vec<Movie>),
        (status = 400, description = "Invalid count", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn search_movies(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<MovieSearchQuery>,
) -> AppResult<HttpResponse> {
    let keyword = query.q.as_deref().unwrap_or_default();
    if keyword.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<Movie>::new()));
    }

    let mut count = parse_count(query.count.as_deref(), "count")?.unwrap_or(0);
    let anonymous_client = req
        .headers()
        .get(USER_AGENT)
        .map_or(true, |ua| ua.as_bytes().is_empty());
    if count == 0 && anonymous_client {
        count = data.config.search_limit;
    }

    let image_size = query.s.as_deref().unwrap_or_default();
    if query.search_type.as_deref() == Some("full") {
        let infos = data
            .movies
            .search_full(keyword, count, image_size)
            .await
            .map_err(upstream_failure("full movie search"))?;
        info!("Resolved {} movies for {:?}", infos.len(), keyword);
        return Ok(HttpResponse::Ok().json(infos));
    }

    let movies = data
        .movies
        .search(keyword, count, image_size)
        .await
        .map_err(upstream_failure("movie search"))?;
    Ok(HttpResponse::Ok().json(movies))
}

/// Image size hint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ImageSizeQuery {
    /// Image size hint (`m` or `l`)
    pub s: Option<String>,
}

/// GET /movies/{sid} - Movie or TV series details
#[utoipa::path(
    get,
    path = "/movies/{sid}",
    tag = "movie",
    params(
        ("sid" = String, Path, description = "Douban subject id"),
        ImageSizeQuery
    ),
    responses(
        (status = 200, description = "Subject details", body = MovieInfo),
        (status = 404, description = "Subject not found", body = ApiError),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_movie(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ImageSizeQuery>,
) -> AppResult<HttpResponse> {
    let sid = path.into_inner();
    let info = data
        .movies
        .get_movie_info(&sid, query.s.as_deref().unwrap_or_default())
        .await
        .map_err(upstream_failure("movie detail"))?;
    Ok(HttpResponse::Ok().json(info))
}

/// GET /movies/{sid}/celebrities - Directors, voice actors and actors
#[utoipa::path(
    get,
    path = "/movies/{sid}/celebrities",
    tag = "movie",
    params(
        ("sid" = String, Path, description = "Douban subject id")
    ),
    responses(
        (status = 200, description = "Cast list, at most 15 people", body = Vec<Celebrity>),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_movie_celebrities(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let sid = path.into_inner();
    let celebrities = data
        .movies
        .get_celebrities(&sid)
        .await
        .map_err(upstream_failure("cast list"))?;
    Ok(HttpResponse::Ok().json(celebrities))
}

/// GET /celebrities/{id} - Celebrity profile
#[utoipa::path(
    get,
    path = "/celebrities/{id}",
    tag = "movie",
    params(
        ("id" = String, Path, description = "Douban celebrity id")
    ),
    responses(
        (status = 200, description = "Celebrity profile", body = CelebrityInfo),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_celebrity(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let profile = data
        .movies
        .get_celebrity(&id)
        .await
        .map_err(upstream_failure("celebrity profile"))?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /photo/{sid} - Wallpaper photos of a subject
#[utoipa::path(
    get,
    path = "/photo/{sid}",
    tag = "movie",
    params(
        ("sid" = String, Path, description = "Douban subject id")
    ),
    responses(
        (status = 200, description = "Photos, largest first", body = Vec<Photo>),
        (status = 502, description = "Douban request failed", body = ApiError)
    )
)]
pub async fn get_photos(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let sid = path.into_inner();
    let photos = data
        .movies
        .get_wallpaper(&sid)
        .await
        .map_err(upstream_failure("photos"))?;
    Ok(HttpResponse::Ok().json(photos))
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ProxyQuery {
    /// Image URL to fetch with the scraper's identity and cookies
    pub url: Option<String>,
}

/// GET /proxy - Fetch an image through the scraper
///
/// The upstream status, content type and body are passed through unchanged.
#[utoipa::path(
    get,
    path = "/proxy",
    tag = "movie",
    params(ProxyQuery),
    responses(
        (status = 200, description = "Upstream bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Missing or invalid url", body = ApiError),
        (status = 502, description = "Upstream request failed", body = ApiError)
    )
)]
pub async fn proxy_image(
    data: web::Data<AppState>,
    query: web::Query<ProxyQuery>,
) -> AppResult<HttpResponse> {
    let url = match query.url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::validation("url is required")),
    };

    let image = data
        .movies
        .proxy_image(url)
        .await
        .map_err(upstream_failure("proxied image"))?;

    let status = StatusCode::from_u16(image.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = image
        .content_type
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
    Ok(HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, content_type))
        .body(image.body))
}

/// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Douban Scraper API",
        version = "0.1.0",
        description = "Movie, celebrity, book and media metadata scraped from douban.com",
        license(
            name = "MIT"
        )
    ),
    paths(
        index,
        search_movies,
        get_movie,
        get_movie_celebrities,
        get_celebrity,
        get_photos,
        proxy_image,
        book::search_books,
        book::get_book_by_id,
        book::get_book_by_isbn,
        media::hot_tv,
        media::hot_movie,
        media::latest_movie,
        media::high_rating_movie
    ),
    components(
        schemas(
            Movie,
            MovieInfo,
            Celebrity,
            CelebrityInfo,
            Photo,
            Book,
            BookImages,
            BookRating,
            BookTag,
            BookSearchResult,
            HotMediaResponse,
            HotMediaTag,
            HotMediaOption,
            HotMediaItem,
            HotMediaRating,
            HotMediaPic,
            ApiError,
            MovieSearchQuery,
            ImageSizeQuery,
            ProxyQuery,
            book::BookSearchQuery,
            media::PageQuery
        )
    ),
    tags(
        (name = "index", description = "Endpoint list"),
        (name = "movie", description = "Movies, cast, celebrities and photos"),
        (name = "book", description = "Book search and details"),
        (name = "media", description = "Hot and recent media listings")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/movies", web::get().to(search_movies))
        .route("/movies/{sid}", web::get().to(get_movie))
        .route("/movies/{sid}/celebrities", web::get().to(get_movie_celebrities))
        .route("/celebrities/{id}", web::get().to(get_celebrity))
        .route("/photo/{sid}", web::get().to(get_photos))
        .route("/proxy", web::get().to(proxy_image))
        .service(
            web::scope("/v2")
                .route("/book/search", web::get().to(book::search_books))
                .route("/book/id/{sid}", web::get().to(book::get_book_by_id))
                .route("/book/isbn/{isbn}", web::get().to(book::get_book_by_isbn))
                .route("/media/hot/tv", web::get().to(media::hot_tv))
                .route("/media/hot/movie", web::get().to(media::hot_movie))
                .route("/media/latest/movie", web::get().to(media::latest_movie))
                .route("/media/high-rating/movie", web::get().to(media::high_rating_movie)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(None, "count").unwrap(), None);
        assert_eq!(parse_count(Some("5"), "count").unwrap(), Some(5));
        assert_eq!(parse_count(Some("-1"), "count").unwrap(), Some(-1));
        assert!(parse_count(Some(" 5 "), "count").is_err());
        assert!(parse_count(Some(""), "count").is_err());
        assert!(matches!(
            parse_count(Some("five"), "count"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/movies".to_string()));
        assert!(paths.contains(&"/v2/book/isbn/{isbn}".to_string()));
        assert!(paths.contains(&"/v2/media/high-rating/movie".to_string()));
    }
}
