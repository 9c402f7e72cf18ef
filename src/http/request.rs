use std::collections::HashMap;

/// HTTP request methods.
///
/// Every standard method is recognised by the parser, but only GET is
/// served; the dispatcher answers anything else with the not-found page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
}

/// A parsed request head.
///
/// Built once per connection from the request line and header block;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// The raw request target, query string included (e.g. "/movie?name=Up")
    pub path: String,
    /// HTTP version (defaults to "HTTP/1.0" when the client omits it)
    pub version: String,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    /// Header fields keyed by name as sent; a repeated name keeps the last value
    pub headers: HashMap<String, String>,
}

/// Assembles a `Request` without going through the wire parser.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
}

impl Method {
    /// Matches a request-line method token. Tokens are case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use reelserve::http::request::Method;
    /// assert_eq!(Method::from_str("PATCH"), Some(Method::PATCH));
    /// assert!(Method::from_str("patch").is_none());
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let path = self.path.ok_or("path missing")?;
        if !path.starts_with('/') {
            return Err("path must start with '/'");
        }

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            query: parse_query(&path),
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Header lookup ignoring ASCII case of the name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Retrieves a decoded query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|v| v.as_str())
    }

    /// The request path without its query string.
    pub fn target_path(&self) -> &str {
        self.path
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.path)
    }
}

/// Decodes the query string of `path` as `application/x-www-form-urlencoded`.
pub fn parse_query(path: &str) -> HashMap<String, String> {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}
