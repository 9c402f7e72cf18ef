use std::collections::HashMap;

/// HTTP status codes the server emits.
///
/// - `Ok` (200): Resource produced
/// - `BadRequest` (400): Malformed request, or the not-found page
/// - `InternalServerError` (500): Even the not-found page could not be produced
/// - `BadGateway` (502): Movie lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
    /// 502 Bad Gateway
    BadGateway,
}

impl StatusCode {
    /// Numeric code for the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use reelserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::BadGateway.as_u16(), 502);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::BadGateway => 502,
        }
    }

    /// Default reason phrase; a response may override it.
    ///
    /// # Example
    ///
    /// ```
    /// # use reelserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::BadGateway.reason_phrase(), "Bad Gateway");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::BadGateway => "Bad Gateway",
        }
    }
}

/// One response per connection, written once and followed by a close.
///
/// The body is raw bytes so text and binary payloads share one framing path.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Overrides the standard reason phrase on the status line
    pub reason: Option<&'static str>,
    /// Header fields; `Content-Type` is written first on the wire
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Fluent construction of a `Response`.
///
/// # Example
///
/// ```
/// # use reelserve::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("text/css")
///     .body("body{}")
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("6"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    reason: Option<&'static str>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Replaces the reason phrase written after the status code.
    pub fn reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.header("Content-Type", value)
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds `Content-Length` from the body size and `Connection: close`
    /// unless either is already present.
    pub fn build(mut self) -> Response {
        self.headers
            .entry("Content-Length".to_string())
            .or_insert_with(|| self.body.len().to_string());
        self.headers
            .entry("Connection".to_string())
            .or_insert_with(|| "close".to_string());

        Response {
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a 200 OK response with the given content type and body.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .content_type(content_type)
            .body(body)
            .build()
    }

    /// Creates a 400 Bad Request response for an unparseable request.
    pub fn bad_request(detail: &str) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .content_type("text/plain")
            .body(format!("400 Bad Request: {}", detail))
            .build()
    }

    /// Creates a 502 Bad Gateway response.
    pub fn bad_gateway() -> Self {
        ResponseBuilder::new(StatusCode::BadGateway)
            .content_type("text/plain")
            .body(b"502 Bad Gateway\n\nThe movie service did not return a usable record.".to_vec())
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .content_type("text/plain")
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }

    /// The reason phrase that goes on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        self.reason.unwrap_or_else(|| self.status.reason_phrase())
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }
}
