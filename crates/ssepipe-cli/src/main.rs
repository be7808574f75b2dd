mod config;
mod pipe;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LoggingConfig};
use ssepipe_core::TextEncoding;

/// Encode CRLF-delimited JSON records (or JSON lines in object mode) as Server-Sent Events
#[derive(Debug, Parser)]
#[command(name = "ssepipe", version)]
struct Args {
    /// Config file (defaults to config/default.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input file, `-` for stdin
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Fetch records from an HTTP endpoint instead of a file
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Treat each input line as one already-decoded JSON record
    #[arg(long)]
    object_mode: bool,

    /// Encoding of raw input bytes (utf8, latin1)
    #[arg(long)]
    encoding: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(path) = &self.input {
            config.input.url = None;
            config.input.path = (path.as_os_str() != "-").then(|| path.clone());
        }
        if let Some(url) = &self.url {
            config.input.path = None;
            config.input.url = Some(url.clone());
        }
        if self.object_mode {
            config.encoder.object_mode = true;
        }
        if let Some(label) = &self.encoding {
            config.encoder.encoding = label.parse::<TextEncoding>()?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    args.apply(&mut config)?;

    // Initialize logging
    init_logging(&config.logging);

    tracing::info!(
        mode = %config.encoder.mode(),
        encoding = %config.encoder.encoding,
        "Starting ssepipe"
    );

    let mut stdout = tokio::io::stdout();
    let options = &config.encoder;

    let summary = if let Some(url) = &config.input.url {
        if options.object_mode {
            tracing::warn!("Object mode does not apply to HTTP input, reading raw records");
        }
        pipe::pipe_url(url, &mut stdout, options).await?
    } else {
        let reader = open_input(config.input.path.as_ref()).await?;
        if options.object_mode {
            pipe::pipe_structured(reader, &mut stdout, options).await?
        } else {
            pipe::pipe_raw(reader, &mut stdout, options, config.input.read_size).await?
        }
    };

    tracing::info!(
        blocks = summary.blocks,
        rejected = summary.rejected,
        "Stream finished"
    );

    Ok(())
}

async fn open_input(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            tracing::info!("Reading records from {}", path.display());
            Ok(Box::new(file))
        }
        None => {
            tracing::info!("Reading records from stdin");
            Ok(Box::new(tokio::io::stdin()))
        }
    }
}

fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries the event stream, logs go to stderr
    match config.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
