// Encoder configuration
// Selects the operating mode and how incoming bytes are turned into text

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SseError;

/// Operating mode of the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Input chunks are already-decoded records
    Structured,
    /// Input chunks are raw text/bytes holding `\r\n`-delimited JSON records
    Raw,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Raw
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Structured => f.write_str("structured"),
            Mode::Raw => f.write_str("raw"),
        }
    }
}

/// Character encoding used to interpret byte chunks in raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[serde(alias = "utf-8")]
    Utf8,
    #[serde(alias = "binary", alias = "iso-8859-1")]
    Latin1,
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

impl FromStr for TextEncoding {
    type Err = SseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "binary" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            _ => Err(SseError::UnsupportedEncoding(label.to_string())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("utf8"),
            TextEncoding::Latin1 => f.write_str("latin1"),
        }
    }
}

fn default_high_water_mark() -> usize {
    16
}

/// Options recognized by [`SseEncoder`](crate::SseEncoder) and the stream adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Structured mode when true, raw delimiter scanning otherwise
    #[serde(default)]
    pub object_mode: bool,
    /// Raw mode only
    #[serde(default)]
    pub encoding: TextEncoding,
    /// Pass-through buffering hint for the host conduit (channel capacity).
    /// Not interpreted by the encoder itself.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            object_mode: false,
            encoding: TextEncoding::default(),
            high_water_mark: default_high_water_mark(),
        }
    }
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for pre-decoded record input
    pub fn structured() -> Self {
        Self::default().with_object_mode(true)
    }

    pub fn with_object_mode(mut self, enabled: bool) -> Self {
        self.object_mode = enabled;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    pub fn mode(&self) -> Mode {
        if self.object_mode {
            Mode::Structured
        } else {
            Mode::Raw
        }
    }
}
