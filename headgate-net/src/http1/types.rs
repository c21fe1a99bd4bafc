use std::fmt;

use url::Url;
use uuid::Uuid;

use super::headers::HeaderMap;

pub const MAX_HEADER_BYTES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http10,
    Http11,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "1.0",
            Self::Http11 => "1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    Origin,
    Absolute,
    Authority,
    Asterisk,
}

/// Where the request is aimed once the target has been resolved.
///
/// Origin-form and absolute-form targets both end up as a full URL;
/// authority-form (`CONNECT`) and asterisk-form (`OPTIONS *`) stay opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestUri {
    Absolute(Url),
    Authority(String),
    Asterisk,
}

impl RequestUri {
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Absolute(url) => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for RequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(url) => f.write_str(url.as_str()),
            Self::Authority(authority) => f.write_str(authority),
            Self::Asterisk => f.write_str("*"),
        }
    }
}

/// Start line and fields as tokenized, before any semantic checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHead {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    /// Request-target exactly as it appeared on the request line.
    pub target: String,
    pub form: TargetForm,
    /// Resolved target. URL forms are normalized by [`Url`]: scheme and host
    /// are lowercased, a default port is dropped and dot segments are removed.
    pub uri: RequestUri,
    pub version: HttpVersion,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Declared body length, if the first `Content-Length` value is a plain
    /// decimal. The session does not check framing; see
    /// [`validate_framing`](crate::validate_framing).
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("Content-Length")
            .and_then(|value| value.trim().parse().ok())
    }

    /// Whether `chunked` is the final transfer coding.
    pub fn is_chunked(&self) -> bool {
        self.headers.line("Transfer-Encoding").is_some_and(|line| {
            line.rsplit(',')
                .next()
                .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        })
    }
}
