use anyhow::{Context, Result};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::Value;
use ssepipe_core::{encode_response, EncoderOptions, SseEncoder};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// What a run produced
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub blocks: usize,
    pub rejected: usize,
}

impl Summary {
    /// Write blocks in order, counting recoverable errors and stopping on the rest
    async fn write<W>(&mut self, out: &mut W, results: Vec<ssepipe_core::Result<Bytes>>) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut wrote = false;

        for result in results {
            match result {
                Ok(block) => {
                    out.write_all(&block).await.context("Failed to write output")?;
                    self.blocks += 1;
                    wrote = true;
                }
                Err(e) if e.is_recoverable() => {
                    self.rejected += 1;
                    tracing::debug!(error = %e, "Record rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        // SSE consumers expect each event as soon as it is complete
        if wrote {
            out.flush().await.context("Failed to flush output")?;
        }
        Ok(())
    }
}

/// Raw mode: feed fixed-size reads through the encoder
pub async fn pipe_raw<R, W>(
    mut reader: R,
    out: &mut W,
    options: &EncoderOptions,
    read_size: usize,
) -> Result<Summary>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut encoder = SseEncoder::new(options);
    let mut summary = Summary::default();
    let mut buf = vec![0u8; read_size.max(1)];

    loop {
        let n = reader.read(&mut buf).await.context("Failed to read input")?;
        if n == 0 {
            break;
        }
        summary
            .write(out, encoder.encode(Bytes::copy_from_slice(&buf[..n])))
            .await?;
    }

    if let Some(rest) = encoder.finish() {
        tracing::warn!(len = rest.len(), "Input ended mid-record, trailing data dropped");
    }

    Ok(summary)
}

/// Structured mode: one JSON value per input line
pub async fn pipe_structured<R, W>(reader: R, out: &mut W, options: &EncoderOptions) -> Result<Summary>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut encoder = SseEncoder::new(options);
    let mut summary = Summary::default();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(value) => summary.write(out, encoder.encode(value)).await?,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping line that is not JSON");
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}

/// Fetch an upstream body of `\r\n`-delimited records and re-encode it
pub async fn pipe_url<W>(url: &str, out: &mut W, options: &EncoderOptions) -> Result<Summary>
where
    W: AsyncWrite + Unpin,
{
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to connect to {}", url))?
        .error_for_status()?;

    tracing::info!(status = %response.status(), "Connected to upstream");

    let mut summary = Summary::default();
    let mut stream = encode_response(response, options.clone());
    while let Some(item) = stream.next().await {
        summary.write(out, vec![item]).await?;
    }

    Ok(summary)
}
