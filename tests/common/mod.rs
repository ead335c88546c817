//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use douban_scraper::config::Config;
use douban_scraper::constants::SiteUrls;
use douban_scraper::routes::AppState;
use douban_scraper::scraper::{Scraper, ScraperConfig};
use wiremock::MockServer;

/// Transport config whose gate and confirmation endpoints live on `gate`
pub fn gated_config(gate: &MockServer) -> ScraperConfig {
    ScraperConfig {
        gate_host: gate.address().to_string(),
        confirm_url: format!("{}/c", gate.uri()),
        ..ScraperConfig::default()
    }
}

/// Scraper that never sees a gate
pub fn plain_scraper() -> Arc<Scraper> {
    Arc::new(Scraper::new(ScraperConfig::default()).unwrap())
}

/// Application state with every site pointed at `server`
pub fn app_state(server: &MockServer, config: Config) -> AppState {
    AppState::new(plain_scraper(), SiteUrls::single(&server.uri()), config)
}

pub fn gate_page(token: &str, challenge: &str, redirect: &str, difficulty: usize) -> String {
    format!(
        r#"<html><head><script>var difficulty = {difficulty};</script></head><body>
        <form id="sec" method="POST" action="/c">
            <input type="hidden" id="tok" name="tok" value="{token}"/>
            <input type="hidden" id="cha" name="cha" value="{challenge}"/>
            <input type="hidden" id="sol" name="sol" value=""/>
            <input type="hidden" id="red" name="red" value="{redirect}"/>
        </form></body></html>"#,
        difficulty = difficulty,
        token = token,
        challenge = challenge,
        redirect = redirect,
    )
}

pub fn movie_search_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(sid, category, title)| {
            format!(
                r#"<div class="result">
                    <div class="pic"><a class="nbg"><img src="https://img1.doubanio.com/view/photo/s_ratio_poster/public/p{sid}.jpg"></a></div>
                    <div class="title"><h3><span>[{category}]</span><a onclick="moreurl(this,{{i: '0', sid: {sid}, qcat: '1002'}})">{title}</a></h3>
                    <div class="rating-info"><span class="rating_nums">8.5</span><span class="subject-cast">导演 / 演员 / 2001</span></div></div>
                </div>"#,
                sid = sid,
                category = category,
                title = title,
            )
        })
        .collect();
    format!(r#"<html><body><div class="result-list">{}</div></body></html>"#, body)
}

pub fn movie_page(title: &str) -> String {
    format!(
        r#"<html><body><div id="content">
            <h1><span>{title}</span> <span class="year">(2001)</span></h1>
            <div class="rating_self"><strong class="rating_num">9.1</strong></div>
            <div id="info"><span class="pl">导演:</span> 宫崎骏<br/></div>
        </div></body></html>"#,
        title = title,
    )
}

pub fn book_page(title: &str, isbn: &str) -> String {
    format!(
        r#"<html><body><div id="wrapper">
            <h1><span>{title}</span></h1>
            <div id="content">
                <div id="info">
                    <span class="pl">出版社:</span> 作家出版社<br/>
                    <span class="pl">ISBN:</span> {isbn}<br/>
                </div>
                <div class="rating_self"><strong class="rating_num">9.4</strong></div>
            </div>
        </div></body></html>"#,
        title = title,
        isbn = isbn,
    )
}
