//! Hot and recent media listings from the mobile JSON API.

use std::sync::Arc;

use tracing::info;

use crate::constants::{endpoints, SiteUrls};
use crate::models::HotMediaResponse;
use crate::scraper::{Scraper, ScraperError};

/// One recent-hot listing: subject kind plus the category and type filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentHotQuery {
    pub subject: &'static str,
    pub category: &'static str,
    pub media_type: &'static str,
}

impl RecentHotQuery {
    pub const HOT_TV: Self = Self {
        subject: "tv",
        category: "tv",
        media_type: "tv",
    };
    pub const HOT_MOVIE: Self = Self {
        subject: "movie",
        category: "热门",
        media_type: "全部",
    };
    pub const LATEST_MOVIE: Self = Self {
        subject: "movie",
        category: "最新",
        media_type: "全部",
    };
    pub const HIGH_RATING_MOVIE: Self = Self {
        subject: "movie",
        category: "豆瓣高分",
        media_type: "全部",
    };
}

pub struct MediaService {
    scraper: Arc<Scraper>,
    sites: SiteUrls,
}

impl MediaService {
    pub fn new(scraper: Arc<Scraper>, sites: SiteUrls) -> Self {
        Self { scraper, sites }
    }

    pub async fn recent_hot(
        &self,
        listing: RecentHotQuery,
        start: u32,
        limit: u32,
    ) -> Result<HotMediaResponse, ScraperError> {
        let url = endpoints::recent_hot(&self.sites.mobile, listing.subject);
        let start = start.to_string();
        let limit = limit.to_string();
        info!("Fetching {} / {} from {}", listing.category, listing.media_type, url);

        self.scraper
            .fetch_json(
                &url,
                &[
                    ("start", start.as_str()),
                    ("limit", limit.as_str()),
                    ("category", listing.category),
                    ("type", listing.media_type),
                ],
            )
            .await
    }

    pub async fn hot_tv(&self, start: u32, limit: u32) -> Result<HotMediaResponse, ScraperError> {
        self.recent_hot(RecentHotQuery::HOT_TV, start, limit).await
    }

    pub async fn hot_movie(&self, start: u32, limit: u32) -> Result<HotMediaResponse, ScraperError> {
        self.recent_hot(RecentHotQuery::HOT_MOVIE, start, limit).await
    }

    pub async fn latest_movie(&self, start: u32, limit: u32) -> Result<HotMediaResponse, ScraperError> {
        self.recent_hot(RecentHotQuery::LATEST_MOVIE, start, limit).await
    }

    pub async fn high_rating_movie(
        &self,
        start: u32,
        limit: u32,
    ) -> Result<HotMediaResponse, ScraperError> {
        self.recent_hot(RecentHotQuery::HIGH_RATING_MOVIE, start, limit).await
    }
}
