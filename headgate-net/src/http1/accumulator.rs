use log::trace;

pub(crate) const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    NeedMore,
    /// Offset just past the terminating empty line.
    Boundary(usize),
    Overflow,
}

/// Growing byte buffer for a single header block.
#[derive(Debug)]
pub struct Accumulator {
    buffer: Vec<u8>,
    scanned: usize,
    limit: usize,
}

impl Accumulator {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Signal {
        self.buffer.extend_from_slice(chunk);

        // Back up far enough to catch a terminator split across chunks.
        let start = self
            .scanned
            .saturating_sub(HEADER_TERMINATOR.len() - 1);
        if let Some(index) = twoway::find_bytes(&self.buffer[start..], HEADER_TERMINATOR) {
            let index = start + index;
            if index > self.limit {
                return self.overflow();
            }
            return Signal::Boundary(index + HEADER_TERMINATOR.len());
        }

        self.scanned = self.buffer.len();
        if self.buffer.len() > self.limit {
            return self.overflow();
        }

        trace!(
            "buffered {} of {} header bytes",
            self.buffer.len(),
            self.limit
        );
        Signal::NeedMore
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn take(&mut self) -> Vec<u8> {
        self.scanned = 0;
        std::mem::take(&mut self.buffer)
    }

    fn overflow(&mut self) -> Signal {
        self.buffer = Vec::new();
        self.scanned = 0;
        Signal::Overflow
    }
}

#[cfg(test)]
mod tests {
    use super::{Accumulator, Signal};

    #[test]
    fn finds_boundary_in_single_chunk() {
        let mut accumulator = Accumulator::new(4096);
        let signal = accumulator.feed(b"GET / HTTP/1.0\r\n\r\nbody");
        assert_eq!(signal, Signal::Boundary(18));
        assert_eq!(accumulator.buffered(), 22);
    }

    #[test]
    fn finds_boundary_straddling_chunks() {
        let mut accumulator = Accumulator::new(4096);
        assert_eq!(accumulator.feed(b"GET / HTTP/1.0\r"), Signal::NeedMore);
        assert_eq!(accumulator.feed(b"\n\r"), Signal::NeedMore);
        assert_eq!(accumulator.feed(b"\n"), Signal::Boundary(18));
    }

    #[test]
    fn byte_at_a_time_never_misses_boundary() {
        let input = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
        let mut accumulator = Accumulator::new(4096);
        let mut signals = Vec::new();
        for byte in input.iter() {
            signals.push(accumulator.feed(std::slice::from_ref(byte)));
        }
        let last = signals.pop();
        assert_eq!(last, Some(Signal::Boundary(input.len())));
        assert!(signals.iter().all(|signal| *signal == Signal::NeedMore));
    }

    #[test]
    fn overflows_once_limit_exceeded_without_boundary() {
        let mut accumulator = Accumulator::new(8);
        assert_eq!(accumulator.feed(b"AAAAAAAA"), Signal::NeedMore);
        assert_eq!(accumulator.feed(b"A"), Signal::Overflow);
        assert_eq!(accumulator.buffered(), 0);
    }

    #[test]
    fn body_bytes_beyond_limit_do_not_overflow() {
        let mut accumulator = Accumulator::new(20);
        let mut input = b"GET / HTTP/1.0\r\n\r\n".to_vec();
        input.extend_from_slice(&[b'A'; 64]);
        assert_eq!(accumulator.feed(&input), Signal::Boundary(18));
    }

    #[test]
    fn oversized_header_block_in_one_chunk_overflows() {
        let mut accumulator = Accumulator::new(10);
        let signal = accumulator.feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(signal, Signal::Overflow);
    }
}
