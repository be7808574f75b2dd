use bytes::Bytes;
use serde_json::Value;

use crate::buffer_utils::RecordSplitter;
use crate::config::{EncoderOptions, Mode};
use crate::error::{Result, SseError};
use crate::format::format_record;
use crate::types::Record;

/// One chunk handed to the encoder by the host conduit
#[derive(Debug, Clone)]
pub enum Input {
    /// Pre-decoded record (structured mode)
    Record(Record),
    /// Pre-decoded JSON value (structured mode)
    Json(Value),
    /// Raw bytes in the configured encoding (raw mode)
    Bytes(Bytes),
    /// Raw text (raw mode)
    Text(String),
}

impl Input {
    fn kind(&self) -> &'static str {
        match self {
            Input::Record(_) => "record",
            Input::Json(_) => "json",
            Input::Bytes(_) => "bytes",
            Input::Text(_) => "text",
        }
    }
}

impl From<Record> for Input {
    fn from(record: Record) -> Self {
        Input::Record(record)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Json(value)
    }
}

impl From<Bytes> for Input {
    fn from(bytes: Bytes) -> Self {
        Input::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

enum State {
    Structured,
    Raw(RecordSplitter),
}

/// Push-driven SSE encoder.
///
/// Call [`encode`](Self::encode) once per arriving chunk; each call fully
/// processes its chunk and returns the output blocks (and per-record errors)
/// in input order. Only raw mode keeps state between calls.
pub struct SseEncoder {
    state: State,
}

impl SseEncoder {
    pub fn new(options: &EncoderOptions) -> Self {
        let state = match options.mode() {
            Mode::Structured => State::Structured,
            Mode::Raw => State::Raw(RecordSplitter::new(options.encoding)),
        };
        Self { state }
    }

    pub fn mode(&self) -> Mode {
        match self.state {
            State::Structured => Mode::Structured,
            State::Raw(_) => Mode::Raw,
        }
    }

    pub fn encode(&mut self, input: impl Into<Input>) -> Vec<Result<Bytes>> {
        let input = input.into();
        let mode = self.mode();

        match (&mut self.state, input) {
            (State::Structured, Input::Record(record)) => render(&record),
            (State::Structured, Input::Json(value)) => render(&Record::from_json(&value)),
            (State::Raw(splitter), Input::Bytes(bytes)) => to_bytes(splitter.push_bytes(&bytes)),
            (State::Raw(splitter), Input::Text(text)) => to_bytes(splitter.push_str(&text)),
            (_, other) => {
                tracing::warn!(mode = %mode, input = other.kind(), "Rejecting chunk");
                vec![Err(SseError::UnexpectedInput {
                    mode,
                    input: other.kind(),
                })]
            }
        }
    }

    /// End of stream. Returns the unterminated raw remainder that was dropped, if any.
    pub fn finish(self) -> Option<String> {
        match self.state {
            State::Structured => None,
            State::Raw(splitter) => splitter.finish(),
        }
    }
}

fn render(record: &Record) -> Vec<Result<Bytes>> {
    let block = format_record(record);
    if block.is_empty() {
        Vec::new()
    } else {
        vec![Ok(Bytes::from(block))]
    }
}

fn to_bytes(blocks: Vec<Result<String>>) -> Vec<Result<Bytes>> {
    blocks
        .into_iter()
        .map(|block| block.map(Bytes::from))
        .collect()
}
