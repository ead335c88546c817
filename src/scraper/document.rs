//! Document fetching: strict GET plus HTML / JSON decoding of the body.

use reqwest::Response;
use scraper::Html;
use serde::de::DeserializeOwned;

use super::{Scraper, ScraperError};

impl Scraper {
    /// Fetch a page and parse it into an HTML tree
    ///
    /// Status codes of 400 and above are errors. The response body is fully
    /// consumed before this returns, on success and on failure.
    pub async fn fetch_document(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Html, ScraperError> {
        let response = self.fetch(url, query, true).await?;
        read_document(response).await
    }

    /// Fetch a JSON endpoint and deserialize the body
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ScraperError> {
        let response = self.fetch(url, query, true).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ScraperError::DocumentParseError(e.to_string()))
    }
}

/// Consume a response body into an HTML tree
pub async fn read_document(response: Response) -> Result<Html, ScraperError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ScraperError::ResponseError(e.to_string()))?;
    Ok(parse_document(&bytes))
}

/// Parse raw body bytes; invalid UTF-8 sequences become U+FFFD
pub fn parse_document(bytes: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(bytes))
}
