use crate::expr::SCRATCH_CAPACITY;

/// Byte buffer shared by every nesting level of one evaluation.
///
/// Holds in-progress operand names and staged unary markers. Appends past
/// capacity are silently dropped; truncation is a degraded result, not a
/// fault.
#[derive(Debug)]
pub(crate) struct Scratch {
    bytes: Vec<u8>,
}

impl Scratch {
    pub(crate) fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(SCRATCH_CAPACITY),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Erase everything at or above `offset`, restoring a saved mark.
    pub(crate) fn truncate(&mut self, offset: usize) {
        self.bytes.truncate(offset);
    }

    /// Append one byte; dropped when the buffer is full.
    pub(crate) fn push(&mut self, byte: u8) {
        if self.bytes.len() < SCRATCH_CAPACITY {
            self.bytes.push(byte);
        }
    }

    /// Append a slice, truncated to the remaining space.
    pub(crate) fn extend(&mut self, src: &[u8]) {
        let room = SCRATCH_CAPACITY - self.bytes.len();
        self.bytes.extend_from_slice(&src[..src.len().min(room)]);
    }

    /// Bytes from `start` to the current write position.
    pub(crate) fn slice_from(&self, start: usize) -> &[u8] {
        &self.bytes[start..]
    }

    /// Bytes in `start..end`.
    pub(crate) fn range(&self, start: usize, end: usize) -> &[u8] {
        &self.bytes[start..end]
    }
}
