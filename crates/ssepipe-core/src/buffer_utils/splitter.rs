use serde_json::Value;

use super::buffering::CarryOverBuffer;
use crate::config::TextEncoding;
use crate::error::{Result, SseError};
use crate::format::format_value;

/// Reassembles `\r\n`-delimited JSON records from arbitrarily chunked input
/// and renders each complete one as an SSE block.
///
/// Every push returns the outcome of each record completed by that chunk,
/// in delimiter order. Malformed records come back as [`SseError::Decode`]
/// and do not stop the stream. Records that decode but render to nothing
/// (no recognized field) produce no item at all.
pub struct RecordSplitter {
    buffer: CarryOverBuffer,
}

impl RecordSplitter {
    pub fn new(encoding: TextEncoding) -> Self {
        Self {
            buffer: CarryOverBuffer::with_capacity(encoding, 4096),
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        self.buffer.extend_bytes(bytes);
        self.drain()
    }

    pub fn push_str(&mut self, text: &str) -> Vec<Result<String>> {
        self.buffer.extend_str(text);
        self.drain()
    }

    /// Size of the carry-over kept for the next chunk
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// End of stream. An unterminated trailing record is dropped, not an
    /// error; it is returned for diagnostics only.
    pub fn finish(mut self) -> Option<String> {
        let remainder = self.buffer.take_remainder();
        if remainder.is_empty() {
            return None;
        }
        tracing::debug!(len = remainder.len(), "Dropping unterminated trailing record");
        Some(remainder)
    }

    fn drain(&mut self) -> Vec<Result<String>> {
        let mut blocks = Vec::new();

        // Process all complete records in buffer
        while let Some(raw) = self.buffer.next_record() {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => {
                    let block = format_value(&value);
                    if !block.is_empty() {
                        blocks.push(Ok(block));
                    }
                }
                Err(source) => {
                    tracing::warn!(len = raw.len(), error = %source, "Skipping malformed record");
                    blocks.push(Err(SseError::Decode {
                        source,
                        len: raw.len(),
                    }));
                }
            }
        }

        blocks
    }
}
