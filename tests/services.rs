//! Integration tests for the ingestion services against a mock Douban

mod common;

use common::{book_page, movie_page, movie_search_page, plain_scraper};
use douban_scraper::constants::SiteUrls;
use douban_scraper::scraper::ScraperError;
use douban_scraper::service::{BookService, MediaService, MovieService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn movie_service(server: &MockServer) -> MovieService {
    MovieService::new(plain_scraper(), SiteUrls::single(&server.uri()))
}

#[tokio::test]
async fn test_empty_query_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let movies = movie_service(&server).await;
    assert!(movies.search("", 5, "").await.unwrap().is_empty());
    assert!(movies.search_full("", 5, "").await.unwrap().is_empty());

    let books = BookService::new(plain_scraper(), SiteUrls::single(&server.uri()));
    let result = books.search("", 2).await.unwrap();
    assert_eq!(result.code, 0);
    assert!(result.books.is_empty());
}

#[tokio::test]
async fn test_movie_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("cat", "1002"))
        .and(query_param("q", "千与千寻"))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_search_page(&[
            ("1291561", "电影", "千与千寻"),
            ("2", "书籍", "千与千寻 设定集"),
            ("3", "电视剧", "千与千寻 剧版"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let movies = movie_service(&server)
        .await
        .search("千与千寻", 0, "m")
        .await
        .unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].id, "1291561");
    assert_eq!(movies[0].year, "2001");
    assert!(movies[0].image.contains("/photo/m/public/"));
    assert_eq!(movies[1].category, "电视剧");
}

#[tokio::test]
async fn test_movie_info_is_cached_per_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subject/1291561/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_page("千与千寻")))
        .expect(2)
        .mount(&server)
        .await;

    let movies = movie_service(&server).await;
    let first = movies.get_movie_info("1291561", "").await.unwrap();
    let cached = movies.get_movie_info("1291561", "").await.unwrap();
    let other_size = movies.get_movie_info("1291561", "l").await.unwrap();

    assert_eq!(first, cached);
    assert_eq!(first.title, "千与千寻");
    assert_eq!(first.director, "宫崎骏");
    assert_eq!(other_size.id, "1291561");
}

#[tokio::test]
async fn test_movie_info_survives_stray_bytes() {
    let server = MockServer::start().await;
    let mut body = movie_page("千与千寻").into_bytes();
    body.extend_from_slice(b"<!-- ad \xff slot -->");
    Mock::given(method("GET"))
        .and(path("/subject/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let info = movie_service(&server)
        .await
        .get_movie_info("1", "")
        .await
        .unwrap();
    assert_eq!(info.title, "千与千寻");
    assert_eq!(info.director, "宫崎骏");
}

#[tokio::test]
async fn test_search_full_resolves_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_search_page(&[
            ("10", "电影", "甲"),
            ("20", "电影", "乙"),
        ])))
        .mount(&server)
        .await;
    for (sid, title) in [("10", "甲"), ("20", "乙")] {
        Mock::given(method("GET"))
            .and(path(format!("/subject/{}/", sid)))
            .respond_with(ResponseTemplate::new(200).set_body_string(movie_page(title)))
            .mount(&server)
            .await;
    }

    let infos = movie_service(&server)
        .await
        .search_full("x", 0, "")
        .await
        .unwrap();
    let titles: Vec<_> = infos.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["甲", "乙"]);
}

#[tokio::test]
async fn test_search_full_fails_as_a_whole() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_search_page(&[
            ("10", "电影", "甲"),
            ("20", "电影", "乙"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subject/10/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(movie_page("甲")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subject/20/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = movie_service(&server).await.search_full("x", 0, "").await;
    assert!(matches!(result, Err(ScraperError::HttpError(500))));
}

#[tokio::test]
async fn test_wallpaper_query_and_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subject/1291561/photos"))
        .and(query_param("type", "W"))
        .and(query_param("start", "0"))
        .and(query_param("sortby", "size"))
        .and(query_param("size", "a"))
        .and(query_param("subtype", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul class="poster-col3"><li data-id="99"><div class="prop">1920x1080</div></li></ul>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let movies = movie_service(&server).await;
    let photos = movies.get_wallpaper("1291561").await.unwrap();
    let again = movies.get_wallpaper("1291561").await.unwrap();
    assert_eq!(photos, again);
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].width, "1920");
}

#[tokio::test]
async fn test_celebrities_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subject/1/celebrities"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div id="content"><ul class="celebrities-list">
                <li class="celebrity"><div class="info"><a class="name" href="/celebrity/1054454/">宫崎骏 Hayao Miyazaki</a><span class="role">导演 Director</span></div></li>
                <li class="celebrity"><div class="info"><a class="name" href="/celebrity/2/">某人</a><span class="role">制片人 Producer</span></div></li>
            </ul></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/celebrity/1054454/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<div id=\"content\"><h1>宫崎骏 Hayao Miyazaki</h1><div class=\"info\"><ul><li><span>性别</span>:\n 男\n</li></ul></div></div>",
        ))
        .mount(&server)
        .await;

    let movies = movie_service(&server).await;
    let cast = movies.get_celebrities("1").await.unwrap();
    assert_eq!(cast.len(), 1);
    assert_eq!(cast[0].id, "1054454");
    assert_eq!(cast[0].name, "宫崎骏");

    let profile = movies.get_celebrity("1054454").await.unwrap();
    assert_eq!(profile.id, "1054454");
    assert_eq!(profile.gender, "男");
}

#[tokio::test]
async fn test_proxy_passes_status_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p1.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .set_body_bytes(vec![0xff, 0xd8, 0xff]),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let movies = movie_service(&server).await;
    let image = movies
        .proxy_image(&format!("{}/p1.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(image.status, 200);
    assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(image.body, vec![0xff, 0xd8, 0xff]);

    let missing = movies
        .proxy_image(&format!("{}/missing.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn test_book_by_isbn_follows_redirect_and_caches_both_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/isbn/9787506365437/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/subject/4913064/", server.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subject/4913064/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(book_page("活着", "9787506365437")))
        .expect(1)
        .mount(&server)
        .await;

    let books = BookService::new(plain_scraper(), SiteUrls::single(&server.uri()));
    let by_isbn = books.get_book_info_by_isbn("9787506365437").await.unwrap();
    assert_eq!(by_isbn.id, "4913064");
    assert_eq!(by_isbn.title, "活着");
    assert_eq!(by_isbn.isbn13, "9787506365437");
    assert_eq!(by_isbn.rating.average, 9.4);

    // Both keys are now served from the cache
    let by_id = books.get_book_info("4913064").await.unwrap();
    let again = books.get_book_info_by_isbn("9787506365437").await.unwrap();
    assert_eq!(by_id, by_isbn);
    assert_eq!(again, by_isbn);
}

#[tokio::test]
async fn test_book_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subject/0/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let books = BookService::new(plain_scraper(), SiteUrls::single(&server.uri()));
    let result = books.get_book_info("0").await;
    assert!(matches!(result, Err(ScraperError::HttpError(404))));
}

#[tokio::test]
async fn test_media_recent_hot_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rexxar/api/v2/subject/recent_hot/movie"))
        .and(query_param("start", "0"))
        .and(query_param("limit", "2"))
        .and(query_param("category", "豆瓣高分"))
        .and(query_param("type", "全部"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "category": "豆瓣高分",
            "type": "全部",
            "total": 1,
            "items": [{
                "id": "1292052",
                "title": "肖申克的救赎",
                "type": "movie",
                "rating": {"count": 3000000, "max": 10, "star_count": 5.0, "value": 9.7},
                "pic": {"large": "l.jpg", "normal": "n.jpg"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let media = MediaService::new(plain_scraper(), SiteUrls::single(&server.uri()));
    let listing = media.high_rating_movie(0, 2).await.unwrap();
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].title, "肖申克的救赎");
}
