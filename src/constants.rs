//! Constants for the Douban scraper
//!
//! Site base URLs, endpoint URL builders and the fixed allow-lists used while
//! extracting listings.

/// Base URLs of the Douban hosts the engine talks to
///
/// Defaults point at production; tests swap them for a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    /// `https://www.douban.com`, hosts the unified search
    pub www: String,
    /// `https://douban.com`, hosts the ISBN redirector
    pub root: String,
    /// `https://movie.douban.com`
    pub movie: String,
    /// `https://book.douban.com`
    pub book: String,
    /// `https://m.douban.com`, hosts the rexxar JSON API
    pub mobile: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            www: "https://www.douban.com".to_string(),
            root: "https://douban.com".to_string(),
            movie: "https://movie.douban.com".to_string(),
            book: "https://book.douban.com".to_string(),
            mobile: "https://m.douban.com".to_string(),
        }
    }
}

impl SiteUrls {
    /// Point every host at the same base URL
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            www: base.clone(),
            root: base.clone(),
            movie: base.clone(),
            book: base.clone(),
            mobile: base,
        }
    }
}

/// URL builder functions for all endpoints
pub mod endpoints {
    /// Unified search page, parameterised with `cat` and `q`
    pub fn search(www: &str) -> String {
        format!("{}/search", www)
    }

    /// Movie subject page
    pub fn movie(movie_base: &str, sid: &str) -> String {
        format!("{}/subject/{}/", movie_base, sid)
    }

    /// Full cast and crew page of a movie
    pub fn movie_celebrities(movie_base: &str, sid: &str) -> String {
        format!("{}/subject/{}/celebrities", movie_base, sid)
    }

    /// Celebrity profile page
    pub fn celebrity(movie_base: &str, id: &str) -> String {
        format!("{}/celebrity/{}/", movie_base, id)
    }

    /// Photo gallery of a movie
    pub fn movie_photos(movie_base: &str, sid: &str) -> String {
        format!("{}/subject/{}/photos", movie_base, sid)
    }

    /// Book subject page
    pub fn book(book_base: &str, id: &str) -> String {
        format!("{}/subject/{}/", book_base, id)
    }

    /// ISBN lookup, redirects to the book subject page
    pub fn isbn(root: &str, isbn: &str) -> String {
        format!("{}/isbn/{}/", root, isbn)
    }

    /// Rexxar "recent hot" JSON listing
    pub fn recent_hot(mobile: &str, subject: &str) -> String {
        format!("{}/rexxar/api/v2/subject/recent_hot/{}", mobile, subject)
    }

    /// Photo CDN URL; `size` is one of `s`, `m`, `l`
    pub fn photo(size: &str, id: &str) -> String {
        format!("https://img2.doubanio.com/view/photo/{}/public/p{}.jpg", size, id)
    }
}

/// Query values and allow-lists
pub mod filters {
    /// Search category for movies and TV
    pub const MOVIE_SEARCH_CAT: &str = "1002";

    /// Search category for books
    pub const BOOK_SEARCH_CAT: &str = "1001";

    /// Listing categories kept from a movie search: movie, TV series
    pub const MOVIE_CATEGORIES: &[&str] = &["电影", "电视剧"];

    /// Role categories kept from a full cast list: director, voice, actor
    pub const CAST_ROLES: &[&str] = &["导演", "配音", "演员"];

    /// Maximum number of people returned from a full cast list
    pub const MAX_CELEBRITIES: usize = 15;

    /// Image size hints that rewrite scraped poster URLs
    pub const IMAGE_SIZES: &[&str] = &["m", "l"];

    /// Size token found in small poster URLs
    pub const POSTER_SIZE_TOKEN: &str = "s_ratio_poster";
}

/// Cache sizing per domain
pub mod cache {
    use std::time::Duration;

    /// Entry cap shared by all caches
    pub const CAPACITY: usize = 100;

    /// Movie detail and photo caches
    pub const MOVIE_TTL: Duration = Duration::from_secs(60);

    /// Book cache
    pub const BOOK_TTL: Duration = Duration::from_secs(10 * 60);
}
