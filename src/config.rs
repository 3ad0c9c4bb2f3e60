use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::postgres::DEFAULT_CSTRING_SCAN_LIMIT;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecoderConfig {
    /// Bytes examined per C-string before giving up on a terminator.
    #[serde(default = "default_cstring_scan_limit")]
    pub cstring_scan_limit: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            cstring_scan_limit: default_cstring_scan_limit(),
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cstring_scan_limit == 0 {
            return Err(Error::InvalidConfig(
                "decoder.cstring_scan_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.decoder.validate()?;
        Ok(config)
    }

    /// Builds a configuration from defaults and `PGOUTPUT_` variables only.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder().add_source(env_source()).build()?;

        let config: Config = settings.try_deserialize()?;
        config.decoder.validate()?;
        Ok(config)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix("PGOUTPUT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_cstring_scan_limit() -> usize {
    DEFAULT_CSTRING_SCAN_LIMIT
}

fn default_log_filter() -> String {
    "pgoutput_decoder=info,pgoutput_dump=info,warn".to_string()
}
