//! End-to-end tests over real sockets

mod common;

use common::*;
use reelserve::codec::transcode;
use reelserve::routing::ImageExtension;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(8, 8, |x, y| {
        image::Rgba([(x * 30) as u8, (y * 30) as u8, 200, 255])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

async fn setup(movie_base_url: &str) -> (TempDir, TestServer) {
    let dir = TempDir::new().unwrap();
    write_not_found_page(dir.path());
    let server = start_server(test_config(dir.path(), movie_base_url)).await;
    (dir, server)
}

#[tokio::test]
async fn test_movie_lookup_renders_fragment() {
    let backend = spawn_movie_backend(json_reply("HTTP/1.1 200 OK", INCEPTION_JSON)).await;
    let (_dir, server) = setup(&backend).await;

    let response = get(server.addr, "/movie?name=Inception").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("text/json"));
    let body = response.text();
    assert!(body.contains("<h2>Inception</h2>"));
    assert!(body.contains(r#"<img src="http://x/p.jpg"/>"#));
}

#[tokio::test]
async fn test_static_css_served_verbatim() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("styles.css"), "body{color:red}").unwrap();

    let response = get(server.addr, "/styles.css").await;

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.header("Content-Type"), Some("text/css"));
    assert_eq!(response.text(), "body{color:red}");
}

#[tokio::test]
async fn test_static_text_preserves_line_breaks() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    let script = "function a() {\n  return 1;\n}\r\n\nconsole.log(a());\n";
    std::fs::write(dir.path().join("app.js"), script).unwrap();

    let response = get(server.addr, "/app.js").await;

    assert_eq!(response.header("Content-Type"), Some("text/js"));
    assert_eq!(response.text(), script);
}

#[tokio::test]
async fn test_png_is_reencoded() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    let source = sample_png();
    std::fs::write(dir.path().join("logo.png"), &source).unwrap();

    let response = get(server.addr, "/logo.png").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("image/png"));
    assert_eq!(response.body, transcode(&source, ImageExtension::Png).unwrap());
}

#[tokio::test]
async fn test_unknown_extension_gets_not_found_page() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("unknown.txt"), "exists but not served").unwrap();

    let response = get(server.addr, "/unknown.txt").await;

    assert_eq!(response.status_line, "HTTP/1.1 400 Not Found");
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert_eq!(response.text(), NOT_FOUND_HTML);
}

#[tokio::test]
async fn test_missing_asset_gets_not_found_page() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    let response = get(server.addr, "/missing.css").await;

    assert_eq!(response.status(), 400);
    assert_eq!(response.text(), NOT_FOUND_HTML);
}

#[tokio::test]
async fn test_traversal_gets_not_found_page() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    let response = get(server.addr, "/../../etc/hostname.css").await;

    assert_eq!(response.status(), 400);
    assert_eq!(response.text(), NOT_FOUND_HTML);
}

#[tokio::test]
async fn test_root_serves_search_page() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    let response = get(server.addr, "/").await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert!(response.text().contains("/movie?name="));
}

#[tokio::test]
async fn test_failed_lookup_is_bad_gateway() {
    let backend = spawn_movie_backend(json_reply(
        "HTTP/1.1 200 OK",
        r#"{"Response":"False","Error":"Movie not found!"}"#,
    ))
    .await;
    let (_dir, server) = setup(&backend).await;

    let response = get(server.addr, "/movie?name=Nope").await;

    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn test_empty_request_does_not_stop_server() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("styles.css"), "p{}").unwrap();

    // Peer closes without sending anything
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.shutdown().await.unwrap();
    let mut leftover = Vec::new();
    stream.read_to_end(&mut leftover).await.unwrap();
    assert!(leftover.is_empty());

    let response = get(server.addr, "/styles.css").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "p{}");
}

#[tokio::test]
async fn test_malformed_request_line_is_bad_request() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    let raw = send_raw(server.addr, b"GARBAGE\r\n\r\n").await;
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status_line, "HTTP/1.1 400 Bad Request");
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
}

#[tokio::test]
async fn test_head_without_blank_line_is_served_after_half_close() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("styles.css"), "h1{}").unwrap();

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET /styles.css HTTP/1.1\r\nHost: x\r\n").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "h1{}");
}

#[tokio::test]
async fn test_lf_only_framing_is_accepted() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("page.html"), "<p>hi</p>").unwrap();

    let raw = send_raw(server.addr, b"GET /page.html HTTP/1.1\nHost: x\n\n").await;
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "<p>hi</p>");
}

#[tokio::test]
async fn test_responses_close_the_connection() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    let response = get(server.addr, "/").await;

    assert_eq!(response.header("Connection"), Some("close"));
    assert_eq!(
        response.header("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );
}

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let (_dir, server) = setup("http://127.0.0.1:9/").await;

    server.shutdown.trigger();
    let result = server.handle.await.unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_missing_not_found_page_is_internal_error() {
    let dir = TempDir::new().unwrap();
    let server = start_server(test_config(dir.path(), "http://127.0.0.1:9/")).await;

    let response = get(server.addr, "/missing.css").await;

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_header_without_colon_does_not_change_outcome() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("styles.css"), "a{}").unwrap();

    let raw = send_raw(
        server.addr,
        b"GET /styles.css HTTP/1.1\r\nX-Weird-Line\r\nUser-Agent: caf\xe9\r\n\r\n",
    )
    .await;
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status_line, "HTTP/1.1 200 OK");
    assert_eq!(response.text(), "a{}");
}

#[tokio::test]
async fn test_shutdown_finishes_connection_in_flight() {
    let (dir, server) = setup("http://127.0.0.1:9/").await;
    std::fs::write(dir.path().join("styles.css"), "em{}").unwrap();

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET /styles.css HTTP/1.1\r\n").await.unwrap();
    // Let the server accept and start reading the head
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    server.shutdown.trigger();
    stream.write_all(b"Host: x\r\n\r\n").await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "em{}");
    assert!(server.handle.await.unwrap().is_ok());
}
