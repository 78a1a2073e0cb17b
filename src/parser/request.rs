//! HTTP request parsing and representation.

use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// A parsed request head.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method
    pub method: Method,
    /// The request path, still percent-encoded, without the query string
    pub path: String,
    /// The raw query string, if the target had one
    pub query: Option<String>,
    /// The HTTP version
    pub version: HttpVersion,
    /// Headers in the order they were received
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request from an origin-form target such as `/docs/a.txt?x=1`.
    pub fn new(method: Method, target: &str, version: HttpVersion, headers: Vec<(String, String)>) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };

        Self {
            method,
            path,
            query,
            version,
            headers,
        }
    }

    /// Get a header value. Names are compared case-insensitively and the
    /// first occurrence wins.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The raw `If-Modified-Since` value, if any.
    pub fn if_modified_since(&self) -> Option<&str> {
        self.get_header("If-Modified-Since")
    }

    /// Whether `Accept-Encoding` lists `coding` with a non-zero quality.
    pub fn accepts_encoding(&self, coding: &str) -> bool {
        let Some(accept) = self.get_header("Accept-Encoding") else {
            return false;
        };

        accept.split(',').any(|item| {
            let mut parts = item.split(';').map(str::trim);
            let name = parts.next().unwrap_or_default();
            if !name.eq_ignore_ascii_case(coding) && name != "*" {
                return false;
            }
            // q=0 means "not acceptable"
            !parts.any(|param| {
                param
                    .strip_prefix("q=")
                    .and_then(|q| q.parse::<f32>().ok())
                    .is_some_and(|q| q == 0.0)
            })
        })
    }
}

/// Parse a request head from a byte slice.
///
/// Parsing stops at the first empty line; anything after it, such as a
/// request body, is never looked at. The request line must be UTF-8; header
/// bytes that are not are replaced rather than rejected.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let mut lines = input
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    let request_line = match lines.next().map(std::str::from_utf8) {
        Some(Ok(line)) if !line.trim().is_empty() => line,
        Some(Err(_)) => return Err(Error::MalformedRequestLine("Invalid UTF-8".to_string())),
        _ => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    // Only origin-form targets are served
    let target = parts[1];
    if !target.starts_with('/') {
        return Err(Error::InvalidTarget(target.to_string()));
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let line = String::from_utf8_lossy(line);
        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    if version == HttpVersion::Http11 && !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    Ok(HttpRequest::new(method, target, version, headers))
}
