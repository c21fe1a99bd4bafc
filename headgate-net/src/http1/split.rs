/// Splits a buffer at the end of its header block.
///
/// `end` is the offset returned with [`Signal::Boundary`](super::Signal), so
/// the head keeps its terminating empty line and the leftover is whatever
/// body bytes arrived with it, untouched.
pub fn split_header_block(mut buffer: Vec<u8>, end: usize) -> (Vec<u8>, Vec<u8>) {
    let end = end.min(buffer.len());
    let leftover = buffer.split_off(end);
    (buffer, leftover)
}
