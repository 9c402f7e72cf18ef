//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use reelserve::config::Config;
use reelserve::server::{Server, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const INCEPTION_JSON: &str = r#"{"Title":"Inception","Year":"2010","Rated":"PG-13","Genre":"Sci-Fi","Director":"Christopher Nolan","Plot":"A thief who steals corporate secrets through dream-sharing.","Poster":"http://x/p.jpg","Response":"True"}"#;

pub const NOT_FOUND_HTML: &str = "<html><body><h1>Nothing here</h1></body></html>\n";

/// Formats a JSON reply with an explicit Content-Length.
pub fn json_reply(status_line: &str, body: &str) -> String {
    format!(
        "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

/// Starts a fake movie service that answers every request with `reply`.
///
/// Returns the base URL to configure the client with.
pub async fn spawn_movie_backend(reply: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/", addr)
}

/// A base URL nothing listens on.
pub async fn dead_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

/// Writes the fixture every asset root needs.
pub fn write_not_found_page(root: &Path) {
    std::fs::write(root.join("notFound.html"), NOT_FOUND_HTML).unwrap();
}

pub fn test_config(public_dir: &Path, movie_base_url: &str) -> Config {
    let mut cfg = Config::default();
    cfg.server.listen_addr = "127.0.0.1:0".to_string();
    cfg.server.read_timeout_ms = 2_000;
    cfg.static_files.root = public_dir.to_path_buf();
    cfg.movie_api.base_url = movie_base_url.to_string();
    cfg.movie_api.api_key = Some("test-key".to_string());
    cfg.movie_api.connect_timeout_ms = 1_000;
    cfg.movie_api.request_timeout_ms = 2_000;
    cfg
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<reelserve::error::Result<()>>,
}

pub async fn start_server(cfg: Config) -> TestServer {
    let server = Server::bind(&cfg).await.unwrap();
    let addr = server.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let handle = tokio::spawn(server.run(signal));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Sends raw bytes and reads until the server closes the connection.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

pub async fn get(addr: SocketAddr, path: &str) -> RawResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path);
    RawResponse::parse(&send_raw(addr, request.as_bytes()).await)
}

/// A response split into status line, headers and body.
pub struct RawResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has no header terminator");
        let head = std::str::from_utf8(&raw[..split]).unwrap();
        let mut lines = head.split("\r\n");

        let status_line = lines.next().unwrap().to_string();
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        Self {
            status_line,
            headers,
            body: raw[split + 4..].to_vec(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status_line
            .split(' ')
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}
