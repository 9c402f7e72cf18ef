use std::collections::HashMap;

use thiserror::Error;

use crate::http::request::{Method, Request, parse_query};

/// Upper bound on the request head before it is rejected.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no request line received")]
    Empty,
    #[error("request line needs a method and a path")]
    InvalidRequest,
    #[error("unknown method")]
    InvalidMethod,
    #[error("path must start with '/'")]
    InvalidPath,
    #[error("request head exceeds 64 KiB")]
    TooLarge,
    #[error("request head incomplete")]
    Incomplete,
}

/// Parses a request head terminated by a blank line.
///
/// Returns the request and the number of bytes consumed, or
/// `ParseError::Incomplete` while the terminator has not arrived.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let Some((head_end, consumed)) = find_headers_end(buf) else {
        if buf.len() > MAX_HEAD_SIZE {
            return Err(ParseError::TooLarge);
        }
        return Err(ParseError::Incomplete);
    };

    if head_end > MAX_HEAD_SIZE {
        return Err(ParseError::TooLarge);
    }

    let request = parse_head(&buf[..head_end])?;
    Ok((request, consumed))
}

/// Parses whatever the peer sent before it stopped sending.
///
/// Used when the stream closes or the read times out before a blank line.
/// A trailing line without its newline is dropped unless it is the request
/// line itself.
pub fn parse_truncated_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.len() > MAX_HEAD_SIZE {
        return Err(ParseError::TooLarge);
    }

    let complete = match buf.iter().rposition(|b| *b == b'\n') {
        Some(last_newline) => &buf[..=last_newline],
        None => buf,
    };

    parse_head(complete)
}

fn parse_head(head: &[u8]) -> Result<Request, ParseError> {
    // Only the request line decides the outcome; stray bytes elsewhere are
    // replaced rather than rejected.
    let head_str = String::from_utf8_lossy(head);

    let mut lines = head_str.lines();

    // Request line
    let request_line = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or(ParseError::Empty)?;
    tracing::debug!(line = request_line, "Received");

    let mut parts = request_line.split(' ').filter(|part| !part.is_empty());

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().unwrap_or("HTTP/1.0");

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    if !path.starts_with('/') {
        return Err(ParseError::InvalidPath);
    }

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }
        tracing::debug!(line, "Received");

        let Some((key, value)) = line.split_once(':') else {
            tracing::debug!(line, "Skipping header line without ':'");
            continue;
        };

        headers.insert(
           key.trim().to_string(),
           value.trim().to_string(),
        );
    }

    Ok(Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        query: parse_query(path),
        headers,
    })
}

/// Locates the blank line ending the head.
///
/// Returns `(head_len, consumed)`; accepts both CRLF and bare LF framing.
fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, pos + 4));
    let lf = buf
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| (pos, pos + 2));

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn headers_end_prefers_earliest_terminator() {
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\n\nrest\r\n\r\n"), Some((14, 16)));
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n\r\n"), Some((14, 18)));
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n"), None);
    }

    #[test]
    fn truncated_request_drops_partial_header() {
        let parsed = parse_truncated_request(b"GET /a.css HTTP/1.1\r\nHost: x\r\nAcc").unwrap();

        assert_eq!(parsed.path, "/a.css");
        assert_eq!(parsed.headers.len(), 1);
    }
}
