//! Ingestion services
//!
//! Each service pairs the shared [`Scraper`](crate::scraper::Scraper) with
//! its parsers and caches. Services are cheap to share behind `Arc` and safe
//! to call from many request handlers at once.

pub mod book;
pub mod media;
pub mod movie;

pub use book::BookService;
pub use media::{MediaService, RecentHotQuery};
pub use movie::{MovieService, ProxiedImage};

/// Cache keys for the ingestion caches
mod cache_keys {
    pub fn movie_info(sid: &str, image_size: &str) -> String {
        format!("movie_{}_{}", sid, image_size)
    }
}
