//! Streaming encoder from `\r\n`-delimited JSON records (or pre-decoded
//! records) to Server-Sent Events framing.
//!
//! ```rust
//! use ssepipe_core::{EncoderOptions, SseEncoder};
//!
//! let mut encoder = SseEncoder::new(&EncoderOptions::default());
//! let mut out = encoder.encode("{\"event\":\"ping\",\"da");
//! assert!(out.is_empty());
//!
//! out = encoder.encode("ta\":\"a\\nb\"}\r\n");
//! assert_eq!(out[0].as_ref().unwrap(), "event:ping\ndata:a\ndata:b\n\n");
//! ```

pub mod buffer_utils;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod streaming;
pub mod types;

pub use buffer_utils::{CarryOverBuffer, RecordSplitter};
pub use config::{EncoderOptions, Mode, TextEncoding};
pub use encoder::{Input, SseEncoder};
pub use error::{Result, SseError};
pub use format::{format_record, format_value, split_lines, stringify};
pub use streaming::{encode_byte_stream, encode_response, encode_stream, spawn_encoder, SseStream};
pub use types::{Field, FieldValue, Record};
