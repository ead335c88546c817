//! Scraper module: HTTP transport for Douban
//!
//! Every request carries a fixed browser identity and shares one cookie jar.
//! When Douban substitutes its proof-of-work gate for the requested page the
//! transport solves the challenge, confirms it, and replays the original
//! request once.

pub mod challenge;
pub mod document;

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, Response, Url};
use thiserror::Error;
use tracing::{debug, info, warn};

use challenge::ChallengePatterns;

/// Errors that can occur during scraping operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to server: {0}")]
    NetworkError(String),

    /// Upstream answered with a status >= 400 on a strict fetch
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Error reading response body
    #[error("Failed to read response body: {0}")]
    ResponseError(String),

    /// The gate page did not carry a token, challenge and redirect
    #[error("Failed to parse anti-automation challenge")]
    ChallengeParseError,

    /// The challenge confirmation request failed
    #[error("Failed to confirm anti-automation challenge: {0}")]
    ChallengeConfirmError(String),

    /// Body could not be turned into a document or JSON value
    #[error("Failed to parse response body: {0}")]
    DocumentParseError(String),

    /// Target URL could not be built into a request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// `User-Agent` sent on every request
    pub user_agent: String,
    /// `Origin` sent on every page request
    pub origin: String,
    /// `Referer` sent on every page request
    pub referer: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Host (optionally `host:port`) that serves the gate page
    pub gate_host: String,
    /// Where the solved challenge is posted
    pub confirm_url: String,
    /// Startup cookies as `name=value; name2=value2`
    pub cookie: String,
    /// URL the startup cookies are scoped to
    pub cookie_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            origin: "https://movie.douban.com".to_string(),
            referer: "https://movie.douban.com/".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            gate_host: "sec.douban.com".to_string(),
            confirm_url: "https://sec.douban.com/c".to_string(),
            cookie: String::new(),
            cookie_url: "https://douban.com/".to_string(),
        }
    }
}

/// Desktop Chrome identity presented to Douban
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.131 Safari/537.36";

/// Which pass of a logical fetch is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// First request; a gate page triggers the challenge flow
    Initial,
    /// Replay after a solved challenge; gate detection is off
    Retry,
}

/// HTTP client shared by every ingestion service
pub struct Scraper {
    client: Client,
    config: ScraperConfig,
    patterns: ChallengePatterns,
}

impl Scraper {
    /// Build a scraper with the given configuration and a fresh cookie jar
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let jar = Arc::new(Jar::default());
        let cookie_url = Url::parse(&config.cookie_url)
            .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", config.cookie_url, e)))?;
        seed_cookies(&jar, &config.cookie, &cookie_url);

        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ScraperError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            patterns: ChallengePatterns::new(),
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// GET `url` with `query`, passing the anti-automation gate if it shows up
    ///
    /// With `strict_status` set, a final status of 400 or above is turned into
    /// [`ScraperError::HttpError`] and the body is dropped. Otherwise the
    /// response is handed back unread.
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, &str)],
        strict_status: bool,
    ) -> Result<Response, ScraperError> {
        let mut attempt = Attempt::Initial;
        loop {
            let response = self.send(url, query).await?;

            if attempt == Attempt::Initial && self.is_gate(response.url()) {
                warn!("Hit anti-automation gate at {} while fetching {}", response.url(), url);
                self.pass_gate(response).await?;
                attempt = Attempt::Retry;
                continue;
            }

            return check_status(response, strict_status);
        }
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, ScraperError> {
        debug!("GET {} {:?}", url, query);
        self.client
            .get(url)
            .query(query)
            .header(ORIGIN, &self.config.origin)
            .header(REFERER, &self.config.referer)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(map_send_error)
    }

    /// Whether a response was served by the gate host
    fn is_gate(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let gate = self.config.gate_host.as_str();
        if let Some(port) = url.port() {
            if format!("{}:{}", host, port) == gate {
                return true;
            }
        }
        host == gate || host.ends_with(&format!(".{}", gate))
    }

    /// Read the gate page, solve its challenge and post the answer
    async fn pass_gate(&self, gate: Response) -> Result<(), ScraperError> {
        let gate_url = gate.url().clone();
        let html = gate
            .text()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        let challenge = self.patterns.parse(&html)?;
        let nonce = solve_off_thread(challenge.challenge.clone(), challenge.difficulty).await?;
        info!(
            "Solved gate challenge at difficulty {} with nonce {}",
            challenge.difficulty, nonce
        );

        let confirm_origin = Url::parse(&self.config.confirm_url)
            .map(|u| u.origin().ascii_serialization())
            .map_err(|e| ScraperError::InvalidUrl(e.to_string()))?;
        let nonce = nonce.to_string();
        let form = [
            ("tok", challenge.token.as_str()),
            ("cha", challenge.challenge.as_str()),
            ("sol", nonce.as_str()),
            ("red", challenge.redirect.as_str()),
        ];

        let confirmation = self
            .client
            .post(&self.config.confirm_url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(REFERER, gate_url.as_str())
            .header(ORIGIN, confirm_origin)
            .form(&form)
            .send()
            .await
            .map_err(|e| ScraperError::ChallengeConfirmError(e.to_string()))?;

        // Only the cookies matter; the body is drained and dropped.
        let _ = confirmation.bytes().await;
        Ok(())
    }
}

/// Run the proof-of-work search on the blocking pool
async fn solve_off_thread(challenge: String, difficulty: usize) -> Result<u64, ScraperError> {
    tokio::task::spawn_blocking(move || challenge::solve(&challenge, difficulty))
        .await
        .map_err(|e| ScraperError::ChallengeConfirmError(format!("solver task failed: {}", e)))
}

fn check_status(response: Response, strict_status: bool) -> Result<Response, ScraperError> {
    let status = response.status();
    if strict_status && (status.is_client_error() || status.is_server_error()) {
        return Err(ScraperError::HttpError(status.as_u16()));
    }
    Ok(response)
}

fn map_send_error(e: reqwest::Error) -> ScraperError {
    if e.is_builder() {
        ScraperError::InvalidUrl(e.to_string())
    } else if e.is_timeout() {
        ScraperError::NetworkError("Connection timeout".to_string())
    } else if e.is_connect() {
        ScraperError::NetworkError("Failed to connect to server".to_string())
    } else {
        ScraperError::NetworkError(e.to_string())
    }
}

/// Split a `name=value; name2=value2` cookie string into pairs
///
/// Blank items and items without `=` are skipped.
pub fn parse_cookie_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| item.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn seed_cookies(jar: &Jar, raw: &str, url: &Url) {
    let domain = url.host_str().unwrap_or_default();
    for (name, value) in parse_cookie_pairs(raw) {
        jar.add_cookie_str(&format!("{}={}; Domain={}; Path=/", name, value, domain), url);
    }
}
