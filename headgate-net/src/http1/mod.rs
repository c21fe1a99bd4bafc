mod accumulator;
mod headers;
mod notify;
mod parser;
mod session;
mod split;
mod types;
mod validate;

pub use accumulator::{Accumulator, Signal};
pub use headers::{HeaderEntry, HeaderMap};
pub use notify::NotifyingParser;
pub use parser::{MalformedMessage, MessageParser, Rfc7230Parser};
pub use session::{ParseStatus, RequestHeaderParser};
pub use split::split_header_block;
pub use types::{
    HttpVersion, MAX_HEADER_BYTES, MessageHead, RequestDescriptor, RequestUri, SessionId,
    TargetForm,
};
pub use validate::{validate_framing, validate_target, validate_version};

pub(crate) use validate::parse_authority;
