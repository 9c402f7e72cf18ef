//! Movie metadata lookup over plain HTTP
//!
//! This module connects to the metadata service, sends one `HTTP/1.0`
//! request per lookup and reads the reply until the service closes the
//! connection.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::{Position, Url};

use crate::config::MovieApiConfig;
use crate::error::ServerError;
use crate::movie::record::MovieRecord;

/// Default buffer size for reads
const BUFFER_SIZE: usize = 8192;

/// Largest reply head accepted from the service
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Largest reply body accepted from the service.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Looks movies up by title
#[derive(Debug, Clone)]
pub struct MovieClient {
    /// Service endpoint; the title and key are appended as query parameters
    base_url: Url,

    api_key: Option<String>,

    /// Connection timeout duration
    connect_timeout: Duration,

    /// Request timeout duration
    request_timeout: Duration,
}

impl MovieClient {
    /// Create a new client from configuration
    pub fn new(config: &MovieApiConfig) -> crate::error::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ServerError::Config(format!("movie_api.base_url: {}", e)))?;

        if base_url.host_str().is_none() {
            return Err(ServerError::Config("movie_api.base_url has no host".into()));
        }

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    /// Fetch and decode the record for `title`
    ///
    /// Any transport, status or decoding failure becomes `LookupFailed`.
    pub async fn fetch(&self, title: &str) -> crate::error::Result<MovieRecord> {
        let outcome = self
            .fetch_raw(title)
            .await
            .and_then(|body| MovieRecord::from_json(&body));

        match outcome {
            Ok(record) => {
                tracing::info!(title, year = %record.year, "Movie lookup succeeded");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(title, error = %format!("{:#}", e), "Movie lookup failed");
                Err(ServerError::LookupFailed {
                    title: title.to_string(),
                    reason: format!("{:#}", e),
                })
            }
        }
    }

    /// The full lookup URL for `title`
    pub fn lookup_url(&self, title: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("t", title);
            if let Some(key) = &self.api_key {
                pairs.append_pair("apikey", key);
            }
        }
        url
    }

    /// The raw `HTTP/1.0` GET sent for `title`.
    pub fn build_http_request(&self, title: &str) -> Vec<u8> {
        let url = self.lookup_url(title);
        let target = &url[Position::BeforePath..Position::AfterQuery];

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let mut buffer = Vec::with_capacity(256);
        buffer.extend_from_slice(format!("GET {} HTTP/1.0\r\n", target).as_bytes());
        buffer.extend_from_slice(format!("Host: {}\r\n", host).as_bytes());
        buffer.extend_from_slice(b"Accept: application/json\r\n");
        buffer.extend_from_slice(
            format!("User-Agent: reelserve/{}\r\n", env!("CARGO_PKG_VERSION")).as_bytes(),
        );
        buffer.extend_from_slice(b"Connection: close\r\n");

        // End of headers
        buffer.extend_from_slice(b"\r\n");

        buffer
    }

    /// Connect, send the lookup and return the reply body
    async fn fetch_raw(&self, title: &str) -> Result<Vec<u8>> {
        let host = self.base_url.host_str().context("Lookup URL missing host")?;
        let port = self.base_url.port_or_known_default().unwrap_or(80);

        // Connect with timeout
        let addr = format!("{}:{}", host, port);
        let stream = timeout(self.connect_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to movie service")?;

        tracing::trace!(%addr, "Connected to movie service");

        timeout(
            self.request_timeout,
            self.send_request_and_receive_response(stream, title),
        )
        .await
        .context("Request timeout")?
    }

    async fn send_request_and_receive_response(
        &self,
        mut stream: TcpStream,
        title: &str,
    ) -> Result<Vec<u8>> {
        let request_bytes = self.build_http_request(title);
        stream.write_all(&request_bytes).await?;
        stream.flush().await?;

        tracing::trace!("Lookup request sent");

        let (status, body) = read_http_response(&mut stream).await?;
        if !(200..300).contains(&status) {
            bail!("movie service answered with status {}", status);
        }

        Ok(body)
    }
}

/// Read an HTTP response, returning its status code and body
async fn read_http_response(stream: &mut TcpStream) -> Result<(u16, Vec<u8>)> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    loop {
        let n = stream.read_buf(&mut buffer).await?;

        if n == 0 {
            bail!("Connection closed before complete response received");
        }

        if let Some(headers_end) = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        {
            let headers_bytes = buffer.split_to(headers_end + 4);
            let (status, headers) = parse_response_headers(&headers_bytes)?;

            if headers
                .get("transfer-encoding")
                .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
            {
                bail!("Chunked replies are not supported");
            }

            let body = read_response_body(stream, &mut buffer, &headers).await?;
            return Ok((status, body));
        }

        // Prevent unbounded header growth
        if buffer.len() > MAX_HEAD_SIZE {
            bail!("Response headers too large");
        }
    }
}

/// Parse the status line and headers; header names are lowercased
fn parse_response_headers(headers_bytes: &[u8]) -> Result<(u16, HashMap<String, String>)> {
    let headers_str = std::str::from_utf8(headers_bytes)
        .context("Invalid UTF-8 in response headers")?;

    let mut lines = headers_str.lines();

    let status_line = lines.next().context("Empty response")?;
    let parts: Vec<&str> = status_line.splitn(3, ' ').collect();

    if parts.len() < 2 {
        bail!("Invalid status line: {}", status_line);
    }

    let status: u16 = parts[1].parse()
        .context("Invalid status code")?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        if let Some((key, value)) = line.split_once(':') {
            headers.insert(
                key.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            );
        }
    }

    Ok((status, headers))
}

/// Read the body by Content-Length, or until the service closes
async fn read_response_body(
    stream: &mut TcpStream,
    buffer: &mut BytesMut,
    headers: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let Some(content_length) = headers.get("content-length") else {
        let mut body = buffer.to_vec();
        buffer.clear();
        loop {
            let n = stream.read_buf(buffer).await?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buffer[..n]);
            buffer.clear();
            if body.len() > MAX_BODY_SIZE {
                bail!("Response body exceeds {} bytes", MAX_BODY_SIZE);
            }
        }
        return Ok(body);
    };

    let content_length: usize = content_length
        .parse()
        .context("Invalid Content-Length")?;

    if content_length > MAX_BODY_SIZE {
        bail!("Response body exceeds {} bytes", MAX_BODY_SIZE);
    }

    let mut body = Vec::with_capacity(content_length);

    // Use existing buffer data first
    let from_buffer = buffer.len().min(content_length);
    body.extend_from_slice(&buffer[..from_buffer]);
    buffer.advance(from_buffer);

    // Read remaining bytes
    while body.len() < content_length {
        let remaining = content_length - body.len();
        let to_read = remaining.min(BUFFER_SIZE);

        buffer.resize(to_read, 0);
        let n = stream.read(&mut buffer[..to_read]).await?;

        if n == 0 {
            bail!("Connection closed before complete body received");
        }

        body.extend_from_slice(&buffer[..n]);
    }

    Ok(body)
}
