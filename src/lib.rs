//! Douban Scraper API Library
//!
//! This library scrapes movie, celebrity, photo and book metadata from
//! douban.com, passes its proof-of-work anti-automation gate, caches the
//! results and exposes them through REST API endpoints.

pub mod auth;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod routes;
pub mod scraper;
pub mod service;
