use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use ssepipe_core::EncoderOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderOptions,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where records come from. Stdin when neither is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    /// Read size for file/stdin input
    pub read_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            read_size: 8192,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml, or the explicit `path`
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables: SSEPIPE_<SECTION>__<KEY>, e.g. SSEPIPE_ENCODER__OBJECT_MODE
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let base = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config/default").required(false),
        };

        let builder = ConfigLoader::builder()
            .add_source(base)
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SSEPIPE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssepipe_core::{Mode, TextEncoding};

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [encoder]
            object_mode = true
            encoding = "latin1"
            high_water_mark = 32

            [input]
            path = "records.txt"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.encoder.mode(), Mode::Structured);
        assert_eq!(config.encoder.encoding, TextEncoding::Latin1);
        assert_eq!(config.encoder.high_water_mark, 32);
        assert_eq!(config.input.path, Some(PathBuf::from("records.txt")));
        assert_eq!(config.input.read_size, 8192);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.encoder, EncoderOptions::default());
        assert!(config.input.url.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
