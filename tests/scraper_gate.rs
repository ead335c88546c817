//! Integration tests for the transport and its anti-automation gate
//!
//! A "site" mock server stands in for Douban and a second "gate" server
//! plays sec.douban.com.

mod common;

use common::{gate_page, gated_config};
use douban_scraper::scraper::challenge;
use douban_scraper::scraper::{Scraper, ScraperError};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_gate(gate: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/gate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(gate)
        .await;
}

/// Send the first request for `page` on `site` to the gate
async fn redirect_once(site: &MockServer, gate: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/gate", gate.uri()).as_str()),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(site)
        .await;
}

#[tokio::test]
async fn test_fetch_without_gate() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subject/1/"))
        .and(query_param("s", "l"))
        .and(header("referer", "https://movie.douban.com/"))
        .and(header("origin", "https://movie.douban.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .expect(1)
        .mount(&site)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let response = scraper
        .fetch(&format!("{}/subject/1/", site.uri()), &[("s", "l")], true)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "<p>ok</p>");
}

#[tokio::test]
async fn test_gate_is_solved_and_request_replayed() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    redirect_once(&site, &gate, "/subject/2/").await;
    Mock::given(method("GET"))
        .and(path("/subject/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>real page</p>"))
        .expect(1)
        .mount(&site)
        .await;

    mount_gate(&gate, gate_page("tok-1", "abc", "https://movie.douban.com/subject/2/", 1)).await;
    let nonce = challenge::solve("abc", 1);
    Mock::given(method("POST"))
        .and(path("/c"))
        .and(body_string_contains("tok=tok-1"))
        .and(body_string_contains("cha=abc"))
        .and(body_string_contains(format!("sol={}", nonce).as_str()))
        .and(header("origin", gate.uri().as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gate)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let document = scraper
        .fetch_document(&format!("{}/subject/2/", site.uri()), &[])
        .await
        .unwrap();
    let text: String = document.root_element().text().collect();
    assert!(text.contains("real page"));
}

#[tokio::test]
async fn test_gate_cookie_carried_into_retry() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    redirect_once(&site, &gate, "/subject/3/").await;
    Mock::given(method("GET"))
        .and(path("/subject/3/"))
        .and(header("cookie", "ck=solved"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>with cookie</p>"))
        .expect(1)
        .mount(&site)
        .await;

    mount_gate(&gate, gate_page("t", "cookie", "r", 1)).await;
    Mock::given(method("POST"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "ck=solved; Path=/"))
        .mount(&gate)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let response = scraper
        .fetch(&format!("{}/subject/3/", site.uri()), &[], true)
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "<p>with cookie</p>");
}

#[tokio::test]
async fn test_gate_solved_at_most_once() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    // Douban keeps gating: the replay comes back as the gate page itself
    Mock::given(method("GET"))
        .and(path("/subject/4/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/gate", gate.uri()).as_str()),
        )
        .expect(2)
        .mount(&site)
        .await;
    mount_gate(&gate, gate_page("t", "again", "r", 1)).await;
    Mock::given(method("POST"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&gate)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let response = scraper
        .fetch(&format!("{}/subject/4/", site.uri()), &[], true)
        .await
        .unwrap();
    assert!(response.text().await.unwrap().contains("id=\"tok\""));
}

#[tokio::test]
async fn test_gate_without_token_fails() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    redirect_once(&site, &gate, "/subject/5/").await;
    mount_gate(&gate, "<html><body>blocked</body></html>".to_string()).await;
    Mock::given(method("POST"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gate)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let result = scraper
        .fetch(&format!("{}/subject/5/", site.uri()), &[], true)
        .await;
    assert!(matches!(result, Err(ScraperError::ChallengeParseError)));
}

#[tokio::test]
async fn test_strict_status() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&site)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let url = format!("{}/missing", site.uri());

    let strict = scraper.fetch(&url, &[], true).await;
    assert!(matches!(strict, Err(ScraperError::HttpError(404))));

    let lenient = scraper.fetch(&url, &[], false).await.unwrap();
    assert_eq!(lenient.status().as_u16(), 404);
    assert_eq!(lenient.text().await.unwrap(), "gone");
}

#[tokio::test]
async fn test_connection_failure() {
    let gate = MockServer::start().await;
    let scraper = Scraper::new(gated_config(&gate)).unwrap();

    let result = scraper.fetch("http://127.0.0.1:1/", &[], true).await;
    assert!(matches!(result, Err(ScraperError::NetworkError(_))));
}

#[tokio::test]
async fn test_fetch_json_rejects_malformed_body() {
    let site = MockServer::start().await;
    let gate = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&site)
        .await;

    let scraper = Scraper::new(gated_config(&gate)).unwrap();
    let result: Result<serde_json::Value, _> =
        scraper.fetch_json(&format!("{}/api", site.uri()), &[]).await;
    assert!(matches!(result, Err(ScraperError::DocumentParseError(_))));
}
