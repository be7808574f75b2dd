use thiserror::Error;

use crate::config::Mode;

#[derive(Error, Debug)]
pub enum SseError {
    /// A delimited record was not valid JSON. Non-fatal: the record is skipped.
    #[error("Failed to decode record ({len} bytes): {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        len: usize,
    },

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unexpected {input} input in {mode} mode")]
    UnexpectedInput { mode: Mode, input: &'static str },

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl SseError {
    /// Whether the stream keeps going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SseError::Decode { .. } | SseError::UnexpectedInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, SseError>;
