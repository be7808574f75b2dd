use crate::config::TextEncoding;

const DELIMITER: &str = "\r\n";

/// Carry-over buffer for `\r\n`-delimited records.
///
/// Incoming bytes are decoded to text before they are appended, so records
/// are always cut at character boundaries. With UTF-8, an incomplete
/// multi-byte sequence at the end of a chunk is held back until the next
/// chunk completes it.
pub struct CarryOverBuffer {
    text: String,
    /// Start of the first unconsumed record in `text`
    head: usize,
    /// Everything before this offset is known not to start a delimiter
    scanned: usize,
    /// Incomplete UTF-8 sequence from the end of the last byte chunk
    pending: Vec<u8>,
    encoding: TextEncoding,
}

impl CarryOverBuffer {
    pub fn new(encoding: TextEncoding) -> Self {
        Self::with_capacity(encoding, 0)
    }

    /// Create a new buffer with specified capacity
    pub fn with_capacity(encoding: TextEncoding, capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            head: 0,
            scanned: 0,
            pending: Vec::new(),
            encoding,
        }
    }

    /// Decode bytes with the buffer's encoding and append them
    pub fn extend_bytes(&mut self, bytes: &[u8]) {
        self.compact();

        match self.encoding {
            TextEncoding::Latin1 => self.text.extend(bytes.iter().map(|&b| char::from(b))),
            TextEncoding::Utf8 => {
                if self.pending.is_empty() {
                    self.decode_utf8(bytes);
                } else {
                    let mut joined = std::mem::take(&mut self.pending);
                    joined.extend_from_slice(bytes);
                    self.decode_utf8(&joined);
                }
            }
        }
    }

    /// Append text as-is
    pub fn extend_str(&mut self, text: &str) {
        self.compact();
        self.flush_pending();
        self.text.push_str(text);
    }

    /// Extract the next complete record (without its delimiter).
    /// Returns None if no complete record is available.
    pub fn next_record(&mut self) -> Option<&str> {
        let from = self.scanned.max(self.head);

        match self.text[from..].find(DELIMITER) {
            Some(pos) => {
                let start = self.head;
                let end = from + pos;
                self.head = end + DELIMITER.len();
                self.scanned = self.head;
                Some(&self.text[start..end])
            }
            None => {
                // A trailing `\r` may pair with a `\n` from the next chunk
                self.scanned = if self.text.ends_with('\r') {
                    self.text.len() - 1
                } else {
                    self.text.len()
                };
                None
            }
        }
    }

    /// Take whatever has not formed a complete record, leaving the buffer empty
    pub fn take_remainder(&mut self) -> String {
        self.flush_pending();
        let remainder = self.text.split_off(self.head);
        self.clear();
        remainder
    }

    /// Bytes of unconsumed input, including an incomplete UTF-8 tail
    pub fn len(&self) -> usize {
        self.text.len() - self.head + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.pending.clear();
        self.head = 0;
        self.scanned = 0;
    }

    /// Drop consumed records from the front of the buffer
    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        self.text.drain(..self.head);
        self.scanned = self.scanned.saturating_sub(self.head);
        self.head = 0;
    }

    fn decode_utf8(&mut self, mut input: &[u8]) {
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    return;
                }
                Err(e) => {
                    let (valid, rest) = input.split_at(e.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        self.text.push_str(valid);
                    }

                    match e.error_len() {
                        Some(invalid) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.text.push(char::REPLACEMENT_CHARACTER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8() -> CarryOverBuffer {
        CarryOverBuffer::with_capacity(TextEncoding::Utf8, 64)
    }

    #[test]
    fn test_buffer_basic() {
        let mut buffer = utf8();

        buffer.extend_bytes(b"one\r\ntwo\r\n");

        assert_eq!(buffer.next_record(), Some("one"));
        assert_eq!(buffer.next_record(), Some("two"));
        assert!(buffer.next_record().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_record() {
        let mut buffer = utf8();

        buffer.extend_bytes(b"partial");
        assert!(buffer.next_record().is_none());
        assert_eq!(buffer.len(), 7);

        buffer.extend_bytes(b" record\r\n");
        assert_eq!(buffer.next_record(), Some("partial record"));
    }

    #[test]
    fn test_bare_line_endings_do_not_delimit() {
        let mut buffer = utf8();

        buffer.extend_str("a\nb\rc\n\r");
        assert!(buffer.next_record().is_none());

        buffer.extend_str("\n");
        assert_eq!(buffer.next_record(), Some("a\nb\rc\n"));
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut buffer = utf8();

        buffer.extend_bytes(b"abc\r");
        assert!(buffer.next_record().is_none());

        buffer.extend_bytes(b"\ndef");
        assert_eq!(buffer.next_record(), Some("abc"));
        assert!(buffer.next_record().is_none());
        assert_eq!(buffer.take_remainder(), "def");
    }

    #[test]
    fn test_consecutive_delimiters_yield_empty_record() {
        let mut buffer = utf8();

        buffer.extend_str("a\r\n\r\nb\r\n");
        assert_eq!(buffer.next_record(), Some("a"));
        assert_eq!(buffer.next_record(), Some(""));
        assert_eq!(buffer.next_record(), Some("b"));
        assert!(buffer.next_record().is_none());
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut buffer = utf8();
        let bytes = "é€\r\n".as_bytes();

        // Split inside the three-byte euro sign
        buffer.extend_bytes(&bytes[..3]);
        assert!(buffer.next_record().is_none());
        assert_eq!(buffer.len(), 3);

        buffer.extend_bytes(&bytes[3..]);
        assert_eq!(buffer.next_record(), Some("é€"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buffer = utf8();

        buffer.extend_bytes(b"a\xffb\r\n");
        assert_eq!(buffer.next_record(), Some("a\u{FFFD}b"));
    }

    #[test]
    fn test_dangling_sequence_flushed_before_text() {
        let mut buffer = utf8();

        buffer.extend_bytes(&[b'x', 0xE2, 0x82]);
        buffer.extend_str("y\r\n");
        assert_eq!(buffer.next_record(), Some("x\u{FFFD}y"));
    }

    #[test]
    fn test_latin1_maps_bytes_to_code_points() {
        let mut buffer = CarryOverBuffer::new(TextEncoding::Latin1);

        buffer.extend_bytes(b"caf\xe9\r\n");
        assert_eq!(buffer.next_record(), Some("café"));
    }

    #[test]
    fn test_compaction_keeps_remainder() {
        let mut buffer = utf8();

        buffer.extend_str("first\r\nsec");
        assert_eq!(buffer.next_record(), Some("first"));
        assert!(buffer.next_record().is_none());

        buffer.extend_str("ond\r\n");
        assert_eq!(buffer.next_record(), Some("second"));
        assert!(buffer.is_empty());
    }
}
