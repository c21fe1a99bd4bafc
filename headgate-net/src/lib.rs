mod config;
mod error;
mod http1;

pub use config::ParserConfig;
pub use error::{ConfigError, FramingError, ParseError, ParseErrorKind};

pub use http1::{
    Accumulator, HeaderEntry, HeaderMap, HttpVersion, MAX_HEADER_BYTES, MalformedMessage,
    MessageHead, MessageParser, NotifyingParser, ParseStatus, RequestDescriptor,
    RequestHeaderParser, RequestUri, Rfc7230Parser, SessionId, Signal, TargetForm,
    split_header_block, validate_framing, validate_target, validate_version,
};
