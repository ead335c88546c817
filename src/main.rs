//! Douban Scraper API Server
//!
//! Main entry point for the Douban scraper REST API service.

use std::sync::Arc;

use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use douban_scraper::auth::{require_basic_auth, AuthConfig};
use douban_scraper::config::Config;
use douban_scraper::constants::SiteUrls;
use douban_scraper::routes::{configure_routes, ApiDoc, AppState};
use douban_scraper::scraper::Scraper;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::load();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level().into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_address = format!("{}:{}", config.host, config.port);

    let scraper = Scraper::new(config.scraper_config())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    if config.cookie.is_empty() {
        warn!("DOUBAN_COOKIE is not set, requests go out without a Douban session");
    }

    let auth_config = web::Data::new(AuthConfig {
        credentials: config.basic_auth.clone(),
    });
    if auth_config.credentials.is_some() {
        info!("Basic auth enabled");
    }

    let app_state = web::Data::new(AppState::new(
        Arc::new(scraper),
        SiteUrls::default(),
        config.clone(),
    ));

    info!("Starting Douban Scraper API server on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(auth_config.clone())
            .wrap(from_fn(require_basic_auth))
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
