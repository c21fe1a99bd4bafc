use super::parser::{MessageParser, Rfc7230Parser};
use super::session::{ParseStatus, RequestHeaderParser};
use super::types::{RequestDescriptor, SessionId};
use crate::error::ParseError;

type HeadersObserver<'a> = Box<dyn FnOnce(RequestDescriptor, Vec<u8>) + 'a>;
type ErrorObserver<'a> = Box<dyn FnOnce(ParseError) + 'a>;

/// A session that reports its outcome to registered observers.
///
/// At most one of the two observers ever runs. Both are dropped as soon as
/// the session reaches its result, so whatever they capture is released and
/// a late chunk cannot trigger a second notification.
pub struct NotifyingParser<'a, P = Rfc7230Parser> {
    session: RequestHeaderParser<P>,
    on_headers: Option<HeadersObserver<'a>>,
    on_error: Option<ErrorObserver<'a>>,
}

impl<'a, P: MessageParser> NotifyingParser<'a, P> {
    pub fn new(session: RequestHeaderParser<P>) -> Self {
        Self {
            session,
            on_headers: None,
            on_error: None,
        }
    }

    /// Replaces any previously registered headers observer. Ignored once the
    /// session has finished.
    pub fn on_headers(&mut self, observer: impl FnOnce(RequestDescriptor, Vec<u8>) + 'a) {
        if !self.session.is_finished() {
            self.on_headers = Some(Box::new(observer));
        }
    }

    /// Replaces any previously registered error observer. Ignored once the
    /// session has finished.
    pub fn on_error(&mut self, observer: impl FnOnce(ParseError) + 'a) {
        if !self.session.is_finished() {
            self.on_error = Some(Box::new(observer));
        }
    }

    pub fn remove_observers(&mut self) {
        self.on_headers = None;
        self.on_error = None;
    }

    pub fn observer_count(&self) -> usize {
        usize::from(self.on_headers.is_some()) + usize::from(self.on_error.is_some())
    }

    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn feed(&mut self, chunk: &[u8]) {
        match self.session.feed(chunk) {
            ParseStatus::NeedMore | ParseStatus::Finished => {}
            ParseStatus::Complete { request, leftover } => {
                let observer = self.on_headers.take();
                self.remove_observers();
                if let Some(observer) = observer {
                    observer(request, leftover);
                }
            }
            ParseStatus::Error(error) => {
                let observer = self.on_error.take();
                self.remove_observers();
                if let Some(observer) = observer {
                    observer(error);
                }
            }
        }
    }
}

impl NotifyingParser<'_> {
    pub fn with_defaults() -> Self {
        Self::new(RequestHeaderParser::new())
    }
}

impl<P> std::fmt::Debug for NotifyingParser<'_, P>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyingParser")
            .field("session", &self.session)
            .field("on_headers", &self.on_headers.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
