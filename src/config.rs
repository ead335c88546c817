//! Configuration module for the Douban scraper API
//!
//! Settings come from command-line flags. Every flag falls back to an
//! environment variable (a `.env` file is loaded first), then to its default.

use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::scraper::ScraperConfig;

/// Default search limit for clients that send no `User-Agent`
pub const DEFAULT_SEARCH_LIMIT: i64 = 3;

/// Command-line options
#[derive(Debug, Clone, Parser)]
#[command(name = "douban-scraper", about = "Douban catalog scraper API")]
pub struct Cli {
    /// Listen host
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Search limit for requests without a User-Agent (Jellyfin)
    #[arg(
        long,
        env = "DOUBAN_API_LIMIT_SIZE",
        default_value_t = DEFAULT_SEARCH_LIMIT,
        allow_negative_numbers = true
    )]
    pub limit: i64,

    /// Douban web cookie
    #[arg(long, env = "DOUBAN_COOKIE", default_value = "")]
    pub cookie: String,

    /// Enable debug logging
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    pub debug: bool,

    /// Basic auth username (enabled when both user and password are set)
    #[arg(long, env = "BASIC_USER")]
    pub basic_user: Option<String>,

    /// Basic auth password (enabled when both user and password are set)
    #[arg(long, env = "BASIC_PASS")]
    pub basic_pass: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Movie search limit applied when a client sends no `User-Agent` and no `count`
    pub search_limit: i64,
    /// Douban web cookie seeded into the jar at startup
    pub cookie: String,
    /// Verbose logging
    pub debug: bool,
    /// Basic auth credentials, enabled only when both are set
    pub basic_auth: Option<BasicCredentials>,
    /// Whole-request timeout for upstream calls
    pub request_timeout: Duration,
}

/// Username and password accepted by the basic auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            search_limit: DEFAULT_SEARCH_LIMIT,
            cookie: String::new(),
            debug: false,
            basic_auth: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let basic_auth = match (cli.basic_user, cli.basic_pass) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(BasicCredentials { username, password })
            }
            _ => None,
        };

        Self {
            host: cli.host,
            port: cli.port,
            search_limit: cli.limit.max(0),
            cookie: cli.cookie,
            debug: cli.debug,
            basic_auth,
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
        }
    }
}

impl Config {
    /// Load configuration from the process arguments and environment
    ///
    /// Exits with a usage message when a flag or variable is malformed.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Cli::parse().into()
    }

    /// Transport settings for production Douban with this configuration's
    /// cookie and timeout
    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            cookie: self.cookie.clone(),
            timeout: self.request_timeout,
            ..ScraperConfig::default()
        }
    }

    /// Default `RUST_LOG` directive
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
