use thiserror::Error;

use crate::http1::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("Maximum header size of {limit} exceeded.")]
    Overflow { limit: usize },
    #[error("Invalid message")]
    InvalidMessage,
    #[error("Invalid absolute-form request-target")]
    InvalidRequestTarget,
    #[error("Invalid Host header for HTTP/1.1 request")]
    InvalidHost,
    #[error("Received request with invalid protocol version")]
    UnsupportedVersion,
}

impl ParseErrorKind {
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::UnsupportedVersion => Some(505),
            _ => None,
        }
    }

    /// Response status a connection layer would answer this rejection with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Overflow { .. } => 431,
            Self::UnsupportedVersion => 505,
            _ => 400,
        }
    }
}

/// Terminal failure of one header-parsing session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub session: SessionId,
}

impl ParseError {
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn code(&self) -> Option<u16> {
        self.kind.code()
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }
}

/// Body framing problems found by [`validate_framing`](crate::validate_framing).
///
/// Never produced by the session itself; a connection layer checks framing
/// on the finished request before it starts reading the body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("The value of `Content-Length` is not valid")]
    InvalidContentLength,
    #[error("Only chunked-encoding is allowed for `Transfer-Encoding`")]
    UnsupportedTransferEncoding,
    #[error("Using both `Transfer-Encoding: chunked` and `Content-Length` is not allowed")]
    ConflictingFraming,
}

impl FramingError {
    pub fn status(&self) -> u16 {
        match self {
            Self::UnsupportedTransferEncoding => 501,
            _ => 400,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
