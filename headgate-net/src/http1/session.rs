use log::{debug, trace};

use super::accumulator::{Accumulator, Signal};
use super::parser::{MessageParser, Rfc7230Parser};
use super::split::split_header_block;
use super::types::{RequestDescriptor, SessionId};
use super::validate::{validate_target, validate_version};
use crate::config::ParserConfig;
use crate::error::{ConfigError, ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    NeedMore,
    Complete {
        request: RequestDescriptor,
        leftover: Vec<u8>,
    },
    Error(ParseError),
    /// The session already produced its result; the chunk was ignored.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Reading,
    Finished,
}

/// Header parsing for one request on one connection.
///
/// Chunks are fed in arrival order until the header block is complete. The
/// session then yields a single [`ParseStatus::Complete`] or
/// [`ParseStatus::Error`] and ignores everything fed afterwards.
#[derive(Debug)]
pub struct RequestHeaderParser<P = Rfc7230Parser> {
    id: SessionId,
    accumulator: Accumulator,
    message_parser: P,
    fallback_authority: String,
    state: SessionState,
}

impl RequestHeaderParser {
    pub fn new() -> Self {
        Self::build(ParserConfig::default(), Rfc7230Parser)
    }

    /// Fails when `config` does not pass [`ParserConfig::validate`].
    pub fn with_config(config: ParserConfig) -> Result<Self, ConfigError> {
        Self::with_parser(config, Rfc7230Parser)
    }
}

impl Default for RequestHeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: MessageParser> RequestHeaderParser<P> {
    pub fn with_parser(config: ParserConfig, message_parser: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, message_parser))
    }

    fn build(config: ParserConfig, message_parser: P) -> Self {
        Self {
            id: SessionId::new(),
            accumulator: Accumulator::new(config.max_header_bytes),
            message_parser,
            fallback_authority: config.fallback_authority,
            state: SessionState::Reading,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn buffered(&self) -> usize {
        self.accumulator.buffered()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> ParseStatus {
        if self.is_finished() {
            trace!("session {}: ignoring {} bytes after completion", self.id, chunk.len());
            return ParseStatus::Finished;
        }

        match self.accumulator.feed(chunk) {
            Signal::NeedMore => ParseStatus::NeedMore,
            Signal::Overflow => {
                let limit = self.accumulator.limit();
                self.fail(ParseErrorKind::Overflow { limit })
            }
            Signal::Boundary(end) => {
                let (head, leftover) = split_header_block(self.accumulator.take(), end);
                match self.build_request(&head) {
                    Ok(request) => self.complete(request, leftover),
                    Err(kind) => self.fail(kind),
                }
            }
        }
    }

    fn build_request(&self, head: &[u8]) -> Result<RequestDescriptor, ParseErrorKind> {
        let message = self.message_parser.parse(head).map_err(|err| {
            debug!("session {}: {err}", self.id);
            ParseErrorKind::InvalidMessage
        })?;

        let version = validate_version(&message.version)?;
        validate_target(message, version, &self.fallback_authority)
    }

    fn complete(&mut self, request: RequestDescriptor, leftover: Vec<u8>) -> ParseStatus {
        self.state = SessionState::Finished;
        debug!(
            "session {}: {} {} {} ({} leftover bytes)",
            self.id,
            request.method,
            request.uri,
            request.version,
            leftover.len()
        );
        ParseStatus::Complete { request, leftover }
    }

    fn fail(&mut self, kind: ParseErrorKind) -> ParseStatus {
        self.state = SessionState::Finished;
        debug!("session {}: rejected: {kind}", self.id);
        ParseStatus::Error(ParseError {
            kind,
            session: self.id,
        })
    }
}
