//! Movie ingestion: search, subject details, cast, profiles, photos and
//! the image pass-through.

use std::sync::Arc;

use tracing::{debug, info};

use super::cache_keys;
use crate::cache::TtlCache;
use crate::constants::{cache, endpoints, filters, SiteUrls};
use crate::models::{Celebrity, CelebrityInfo, Movie, MovieInfo, Photo};
use crate::parser::{CelebrityParser, MovieParser, PhotoParser};
use crate::scraper::{Scraper, ScraperError};

/// Upstream image bytes with the metadata the proxy forwards
#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub struct MovieService {
    scraper: Arc<Scraper>,
    sites: SiteUrls,
    movies: MovieParser,
    celebrities: CelebrityParser,
    photos: PhotoParser,
    movie_cache: TtlCache<MovieInfo>,
    photo_cache: TtlCache<Vec<Photo>>,
}

impl MovieService {
    pub fn new(scraper: Arc<Scraper>, sites: SiteUrls) -> Self {
        Self {
            scraper,
            sites,
            movies: MovieParser::new(),
            celebrities: CelebrityParser::new(),
            photos: PhotoParser::new(),
            movie_cache: TtlCache::new(cache::CAPACITY, cache::MOVIE_TTL),
            photo_cache: TtlCache::new(cache::CAPACITY, cache::MOVIE_TTL),
        }
    }

    /// Search movies and TV series
    ///
    /// An empty query returns no results without touching the network.
    pub async fn search(
        &self,
        query: &str,
        limit: i64,
        image_size: &str,
    ) -> Result<Vec<Movie>, ScraperError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = endpoints::search(&self.sites.www);
        info!("Searching movies for {:?}", query);
        let document = self
            .scraper
            .fetch_document(&url, &[("cat", filters::MOVIE_SEARCH_CAT), ("q", query)])
            .await?;

        let movies = self.movies.parse_movies(&document, limit, image_size);
        info!("Parsed {} movies", movies.len());
        Ok(movies)
    }

    /// Search, then resolve every hit to its full record in hit order
    ///
    /// The first failing detail fetch fails the whole call.
    pub async fn search_full(
        &self,
        query: &str,
        limit: i64,
        image_size: &str,
    ) -> Result<Vec<MovieInfo>, ScraperError> {
        let movies = self.search(query, limit, image_size).await?;
        let mut infos = Vec::with_capacity(movies.len());
        for movie in &movies {
            infos.push(self.get_movie_info(&movie.id, image_size).await?);
        }
        Ok(infos)
    }

    /// Subject details, cached per subject and image size
    pub async fn get_movie_info(&self, sid: &str, image_size: &str) -> Result<MovieInfo, ScraperError> {
        let key = cache_keys::movie_info(sid, image_size);
        if let Some(info) = self.movie_cache.get(&key) {
            debug!("Returning cached movie {}", sid);
            return Ok(info);
        }

        let url = endpoints::movie(&self.sites.movie, sid);
        info!("Fetching URL: {}", url);
        let document = self.scraper.fetch_document(&url, &[]).await?;
        let info = self.movies.parse_movie_info(&document, sid, image_size);

        self.movie_cache.put(key, info.clone());
        Ok(info)
    }

    /// Directors, voice actors and actors of a subject
    pub async fn get_celebrities(&self, sid: &str) -> Result<Vec<Celebrity>, ScraperError> {
        let url = endpoints::movie_celebrities(&self.sites.movie, sid);
        info!("Fetching URL: {}", url);
        let document = self.scraper.fetch_document(&url, &[]).await?;

        let celebrities = self.celebrities.parse_celebrities(&document);
        info!("Parsed {} celebrities", celebrities.len());
        Ok(celebrities)
    }

    /// Celebrity profile
    pub async fn get_celebrity(&self, id: &str) -> Result<CelebrityInfo, ScraperError> {
        let url = endpoints::celebrity(&self.sites.movie, id);
        info!("Fetching URL: {}", url);
        let document = self.scraper.fetch_document(&url, &[]).await?;
        Ok(self.celebrities.parse_celebrity_info(&document, id))
    }

    /// Wallpaper photos of a subject, largest first, cached per subject
    pub async fn get_wallpaper(&self, sid: &str) -> Result<Vec<Photo>, ScraperError> {
        if let Some(photos) = self.photo_cache.get(sid) {
            debug!("Returning cached photos for {}", sid);
            return Ok(photos);
        }

        let url = endpoints::movie_photos(&self.sites.movie, sid);
        info!("Fetching URL: {}", url);
        let query = [
            ("type", "W"),
            ("start", "0"),
            ("sortby", "size"),
            ("size", "a"),
            ("subtype", "a"),
        ];
        let document = self.scraper.fetch_document(&url, &query).await?;

        let photos = self.photos.parse_wallpapers(&document);
        info!("Parsed {} photos", photos.len());
        self.photo_cache.put(sid, photos.clone());
        Ok(photos)
    }

    /// Fetch an arbitrary URL through the transport without status checks
    pub async fn proxy_image(&self, url: &str) -> Result<ProxiedImage, ScraperError> {
        let response = self.scraper.fetch(url, &[], false).await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        Ok(ProxiedImage {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
