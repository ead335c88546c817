//! Book ingestion: search and detail lookups by id or ISBN.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::constants::{cache, endpoints, filters, SiteUrls};
use crate::models::{Book, BookSearchResult};
use crate::parser::BookParser;
use crate::scraper::document::read_document;
use crate::scraper::{Scraper, ScraperError};

pub struct BookService {
    scraper: Arc<Scraper>,
    sites: SiteUrls,
    parser: BookParser,
    cache: TtlCache<Book>,
}

impl BookService {
    pub fn new(scraper: Arc<Scraper>, sites: SiteUrls) -> Self {
        Self {
            scraper,
            sites,
            parser: BookParser::new(),
            cache: TtlCache::new(cache::CAPACITY, cache::BOOK_TTL),
        }
    }

    /// Search books, wrapped in the `{code, msg, books}` envelope
    pub async fn search(&self, query: &str, count: i64) -> Result<BookSearchResult, ScraperError> {
        Ok(BookSearchResult {
            code: 0,
            msg: String::new(),
            books: self.list(query, count).await?,
        })
    }

    async fn list(&self, query: &str, count: i64) -> Result<Vec<Book>, ScraperError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = endpoints::search(&self.sites.www);
        info!("Searching books for {:?}", query);
        let document = self
            .scraper
            .fetch_document(&url, &[("cat", filters::BOOK_SEARCH_CAT), ("q", query)])
            .await?;

        let books = self.parser.parse_search_list(&document, count);
        info!("Parsed {} books", books.len());
        Ok(books)
    }

    /// Book details by Douban subject id
    pub async fn get_book_info(&self, id: &str) -> Result<Book, ScraperError> {
        if let Some(book) = self.cache.get(id) {
            debug!("Returning cached book {}", id);
            return Ok(book);
        }
        self.fetch_book(&endpoints::book(&self.sites.book, id)).await
    }

    /// Book details by ISBN, following Douban's redirect to the subject page
    pub async fn get_book_info_by_isbn(&self, isbn: &str) -> Result<Book, ScraperError> {
        if let Some(book) = self.cache.get(isbn) {
            debug!("Returning cached book for ISBN {}", isbn);
            return Ok(book);
        }
        self.fetch_book(&endpoints::isbn(&self.sites.root, isbn)).await
    }

    /// Fetch and parse a subject page, caching it under its id and ISBN
    async fn fetch_book(&self, url: &str) -> Result<Book, ScraperError> {
        info!("Fetching URL: {}", url);
        let response = self.scraper.fetch(url, &[], true).await?;
        let id = subject_id(response.url()).unwrap_or_else(|| Utc::now().timestamp().to_string());
        let document = read_document(response).await?;
        let book = self.parser.parse_book_page(&document, &id);

        self.cache.put(id, book.clone());
        if !book.isbn13.is_empty() {
            self.cache.put(book.isbn13.clone(), book.clone());
        }
        Ok(book)
    }
}

/// Last segment of the final URL's path once it has at least two segments
fn subject_id(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path().trim_matches('/').split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    segments
        .iter()
        .rev()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}
