use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Response;
use std::fmt::Display;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::buffer_utils::RecordSplitter;
use crate::config::EncoderOptions;
use crate::encoder::{Input, SseEncoder};
use crate::error::{Result, SseError};

/// Framed SSE output. Per-record errors are items; the stream keeps going after them.
pub type SseStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Encode a stream of input chunks, in the mode selected by `options`
pub fn encode_stream<S, I>(input: S, options: EncoderOptions) -> SseStream
where
    S: Stream<Item = I> + Send + 'static,
    I: Into<Input> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = Box::pin(input);
        let mut encoder = SseEncoder::new(&options);

        while let Some(chunk) = chunks.next().await {
            for item in encoder.encode(chunk) {
                yield item;
            }
        }

        encoder.finish();
    })
}

/// Encode a fallible byte source in raw mode (`object_mode` is ignored).
///
/// An upstream error is yielded as [`SseError::Upstream`] and ends the stream.
pub fn encode_byte_stream<S, B, E>(input: S, options: EncoderOptions) -> SseStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(input);
        let mut splitter = RecordSplitter::new(options.encoding);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    for block in splitter.push_bytes(bytes.as_ref()) {
                        yield block.map(Bytes::from);
                    }
                }
                Err(e) => {
                    yield Err(SseError::Upstream(e.to_string()));
                    break;
                }
            }
        }

        splitter.finish();
    })
}

/// Re-encode an HTTP body of `\r\n`-delimited JSON records as SSE
pub fn encode_response(response: Response, options: EncoderOptions) -> SseStream {
    encode_byte_stream(response.bytes_stream(), options)
}

/// Run the encoder on a tokio task.
///
/// The channel holds at most `options.high_water_mark` blocks; a slow
/// receiver pauses the encoder. Dropping the receiver stops it.
pub fn spawn_encoder<S, I>(input: S, options: EncoderOptions) -> mpsc::Receiver<Result<Bytes>>
where
    S: Stream<Item = I> + Send + 'static,
    I: Into<Input> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(options.high_water_mark.max(1));

    tokio::spawn(async move {
        let mut output = encode_stream(input, options);
        while let Some(item) = output.next().await {
            if tx.send(item).await.is_err() {
                tracing::debug!("Receiver dropped, stopping encoder");
                break;
            }
        }
    });

    rx
}
