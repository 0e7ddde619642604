//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::collections::BTreeSet;
use std::io::Write;
use std::time::{Duration, Instant};
use tempfile::{NamedTempFile, TempDir};
use tidemark::config::{load_config, Config};
use tidemark::output::{run_stamp, write_results};
use tidemark::{CrawlError, CrawlReport, Crawler, PagePath};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout = 5;
    config.crawler.politeness_delay = 0.0;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

async fn crawl(root: &str) -> Result<CrawlReport, CrawlError> {
    let crawler = Crawler::new(root, &create_test_config()).expect("Failed to create crawler");
    crawler.run().await
}

fn keys(report: &CrawlReport) -> BTreeSet<&str> {
    report.results.keys().map(PagePath::as_str).collect()
}

fn fragments<'a>(report: &'a CrawlReport, page: &str) -> &'a [String] {
    report
        .results
        .get(page)
        .unwrap_or_else(|| panic!("{} was not recorded", page))
}

#[tokio::test]
async fn test_three_page_site() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body><h1>Home</h1><p>Welcome to the site</p><a href="/about">About</a> <a href="blog/post1">Read the post</a></body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r##"<html><body><p>About us</p><a href="/">Home</a><a href="#team">Team</a></body></html>"##,
    )
    .await;
    mount_page(
        &server,
        "/blog/post1",
        &format!(
            r#"<html><body><p>First post</p><a href="../about#team">About</a><a href="{}/">Home</a><a href="http://other.invalid/x">Elsewhere</a></body></html>"#,
            base_url
        ),
    )
    .await;

    let report = crawl(&base_url).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/", "/about", "/blog/post1"]));
    assert_eq!(report.pending, 0);

    let home = fragments(&report, "/");
    for expected in ["Home", "Welcome to the site", "About", "Read the post"] {
        assert!(home.contains(&expected.to_string()), "missing {:?}", expected);
    }
    assert!(fragments(&report, "/about").contains(&"About us".to_string()));
    assert!(fragments(&report, "/blog/post1").contains(&"First post".to_string()));

    let stats = &report.statistics;
    assert_eq!(stats.pages_recorded, 3);
    assert_eq!(stats.fetched_ok, 3);
    assert_eq!(stats.cross_host_discarded, 1);
    assert!(stats.duplicates_discarded >= 3);

    // Results serialize to the documented JSON shape
    let dir = TempDir::new().unwrap();
    let written = write_results(&report.results, dir.path(), &run_stamp()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    let object = value.as_object().expect("results must be a JSON object");
    assert_eq!(object.len(), 3);
    assert!(object["/about"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("About us")));
}

#[tokio::test]
async fn test_cycle_is_visited_once() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/a">A</a><a href="./">Home</a>"#).await;

    let report = crawl(&server.uri()).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/", "/a", "/b"]));
    assert_eq!(report.statistics.duplicates_discarded, 2);
    // `.expect(1)` on every mock is verified when the server drops
}

#[tokio::test]
async fn test_robots_crawl_delay_paces_requests() {
    let server = MockServer::start().await;

    mount_robots(
        &server,
        "User-agent: *\nCrawl-delay: 30\n\nUser-agent: TestBot\nCrawl-delay: 0.25",
    )
    .await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "<p>leaf</p>").await;

    let started = Instant::now();
    let report = crawl(&server.uri()).await.expect("Crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(keys(&report), BTreeSet::from(["/", "/a"]));
    // One wait before each of the two dequeues; the config fallback is zero
    assert!(elapsed >= Duration::from_millis(500), "crawl took only {:?}", elapsed);
    // The `*` group's 30s must not apply to TestBot
    assert!(elapsed < Duration::from_secs(10), "crawl took {:?}", elapsed);
}

#[tokio::test]
async fn test_robots_disallowed_page_never_fetched() {
    let server = MockServer::start().await;

    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a><a href="/private/secret">Again</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>Public</p>").await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<p>Secret</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&server.uri()).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/", "/public"]));
    // Re-discovered denied paths are skipped again, not remembered
    assert_eq!(report.statistics.robots_denied, 2);
}

#[tokio::test]
async fn test_sitemap_seeds_unlinked_pages() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_robots(
        &server,
        &format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml", base_url),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/hidden</loc></url>
  <url><loc>{base}/orphan?lang=en</loc></url>
  <url><loc>http://other.invalid/page</loc></url>
</urlset>"#,
                base = base_url
            ),
            "application/xml",
        ))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(&server, "/", "<p>Nothing links anywhere</p>").await;
    mount_page(&server, "/hidden", "<p>Hidden page</p>").await;
    mount_page(&server, "/orphan", "<p>Orphan page</p>").await;

    let report = crawl(&base_url).await.expect("Crawl failed");

    assert_eq!(
        keys(&report),
        BTreeSet::from(["/", "/hidden", "/orphan?lang=en"])
    );
    assert_eq!(fragments(&report, "/hidden"), ["Hidden page".to_string()]);
    assert_eq!(report.statistics.sitemap_entries, 2);
    assert_eq!(report.statistics.cross_host_discarded, 1);
}

#[tokio::test]
async fn test_failed_sitemap_does_not_abort() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_robots(
        &server,
        &format!(
            "Sitemap: {}/broken.xml\nSitemap: http://other.invalid/sitemap.xml",
            base_url
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<p>Home</p>").await;

    let report = crawl(&base_url).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/"]));
    assert_eq!(report.statistics.sitemap_entries, 0);
}

#[tokio::test]
async fn test_no_cross_host_leakage() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="http://other.invalid/">Other</a><a href="https://other.invalid/x">Other TLS</a><a href="mailto:me@example.com">Mail</a><a href="//cdn.invalid/lib.js">CDN</a>"#,
    )
    .await;

    let report = crawl(&base_url).await.expect("Crawl failed");

    // Protocol-relative links are treated as paths on the crawl host
    assert_eq!(
        keys(&report),
        BTreeSet::from(["/", "/cdn.invalid/lib.js"])
    );
    assert!(fragments(&report, "/cdn.invalid/lib.js").is_empty());
    assert_eq!(report.statistics.cross_host_discarded, 3);
}

#[tokio::test]
async fn test_failed_pages_recorded_empty() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/logo.png">Logo</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/from-image">never followed</a>"#, "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(&server.uri()).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/", "/logo.png", "/missing"]));
    assert!(fragments(&report, "/missing").is_empty());
    assert!(fragments(&report, "/logo.png").is_empty());
    assert_eq!(report.statistics.not_found, 1);
    assert_eq!(report.statistics.skipped_content_type, 1);
}

#[tokio::test]
async fn test_unexpected_status_aborts_crawl() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/broken">Broken</a><a href="/after">After</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/after"))
        .respond_with(html("<p>After</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let result = crawl(&server.uri()).await;

    match result {
        Err(CrawlError::UnexpectedStatus { url, status }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/broken"), "unexpected url {}", url);
        }
        other => panic!("expected a fatal status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>Configured</p>").await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[crawler]
request-timeout = 5
politeness-delay = 0.0

[user-agent]
crawler-name = "FileBot"
"#
    )
    .unwrap();

    let config = load_config(file.path()).expect("Failed to load config");
    let crawler = Crawler::new(&server.uri(), &config).unwrap();
    let report = crawler.run().await.expect("Crawl failed");

    assert_eq!(fragments(&report, "/"), ["Configured".to_string()]);
}

/// Serves `/` with a link to `/big`, and `/big` as an endless-looking
/// chunked body with no Content-Length
async fn serve_raw(listener: TcpListener) {
    while let Ok((socket, _)) = listener.accept().await {
        tokio::spawn(handle_raw(socket));
    }
}

async fn handle_raw(mut socket: TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];

    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let page = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let _ = respond_raw(&mut socket, &page).await;
}

async fn respond_raw(socket: &mut TcpStream, page: &str) -> std::io::Result<()> {
    match page {
        "/" => {
            let body = r#"<p>Root</p><a href="/big">Big</a>"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await?;
        }
        "/big" => {
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                )
                .await?;

            // 64 chunks of 16 KiB: 1 MiB in total
            let chunk = vec![b'x'; 16 * 1024];
            for _ in 0..64 {
                socket.write_all(b"4000\r\n").await?;
                socket.write_all(&chunk).await?;
                socket.write_all(b"\r\n").await?;
            }
            socket.write_all(b"0\r\n\r\n").await?;
        }
        _ => {
            socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await?;
        }
    }

    socket.flush().await
}

// `/big` streams 1 MiB past the ceiling with no length declared up front; hyper
// refuses to read beyond a short Content-Length, so chunked encoding stands in
#[tokio::test]
async fn test_body_streamed_past_ceiling_without_declared_length_is_too_large() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_raw(listener));

    let report = crawl(&format!("http://{}", addr)).await.expect("Crawl failed");

    assert_eq!(keys(&report), BTreeSet::from(["/", "/big"]));
    assert_eq!(fragments(&report, "/"), ["Root".to_string(), String::new(), "Big".to_string()]);
    assert!(fragments(&report, "/big").is_empty());
    assert_eq!(report.statistics.skipped_too_large, 1);
}
