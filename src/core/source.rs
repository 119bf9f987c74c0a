//! Sequential byte source
//!
//! Wraps an art file's bytes, hiding any SAUCE trailer from the reader.

use super::sauce::Sauce;

/// EOF marker conventionally placed before a SAUCE record
const EOF_MARKER: u8 = 0x1A;

pub struct ByteSource {
    bytes: Vec<u8>,
    /// Readable length, excluding metadata
    size: usize,
    pos: usize,
    sauce: Option<Sauce>,
}

impl ByteSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        let sauce = Sauce::parse(&bytes);
        let mut size = bytes.len();
        if let Some(ref sauce) = sauce {
            size = size.saturating_sub(sauce.trailer_len());
            if size > 0 && bytes[size - 1] == EOF_MARKER {
                size -= 1;
            }
        }
        Self {
            bytes,
            size,
            pos: 0,
            sauce,
        }
    }

    /// Read one byte and advance
    pub fn get(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Look at the next byte without advancing
    pub fn peek(&self) -> Option<u8> {
        if self.pos < self.size {
            Some(self.bytes[self.pos])
        } else {
            None
        }
    }

    /// Read up to `n` bytes and advance past them
    pub fn read(&mut self, n: usize) -> &[u8] {
        let start = self.pos;
        let end = start.saturating_add(n).min(self.size);
        self.pos = end;
        &self.bytes[start..end]
    }

    /// Move to an absolute position, clamped to the readable length
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.size);
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Readable length
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.size
    }

    pub fn sauce(&self) -> Option<&Sauce> {
        self.sauce.as_ref()
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteSource {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sauce::tests::record;

    #[test]
    fn test_sequential_reads() {
        let mut src = ByteSource::from(&b"abc"[..]);
        assert_eq!(src.peek(), Some(b'a'));
        assert_eq!(src.get(), Some(b'a'));
        assert_eq!(src.read(5), b"bc");
        assert!(src.eof());
        assert_eq!(src.get(), None);
        assert_eq!(src.peek(), None);

        src.seek(1);
        assert_eq!(src.position(), 1);
        assert_eq!(src.get(), Some(b'b'));
        src.seek(99);
        assert!(src.eof());
    }

    #[test]
    fn test_sauce_hidden_from_reader() {
        let mut bytes = b"art".to_vec();
        bytes.push(EOF_MARKER);
        bytes.extend(record("t", 80, 0, &["note"]));

        let mut src = ByteSource::new(bytes);
        assert_eq!(src.len(), 3);
        assert_eq!(src.sauce().map(|s| s.tinfo1), Some(80));
        assert_eq!(src.read(100), b"art");
        assert!(src.eof());
    }

    #[test]
    fn test_plain_file_unchanged() {
        let src = ByteSource::new(b"line\x1a".to_vec());
        assert_eq!(src.len(), 5);
        assert!(src.sauce().is_none());
        assert!(!src.is_empty());
    }
}
