use std::io;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use self::bytes_size::BytesSize;
use self::logging::LoggingConfig;

pub mod bytes_size;
pub mod logging;

#[derive(Parser, Debug, Clone)]
#[command(name = "safehttpd")]
#[command(about = "An http server whose handlers can only answer through a checked response writer", long_about = None)]
pub struct Args {
    #[arg(value_name = "CONFIG", default_value = "")]
    /// config file path(toml)
    pub file: String,

    #[arg(long, default_value = "127.0.0.1:8080")]
    /// listening address, used when the config file leaves it empty
    pub addr: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file failed: {0}")]
    Io(#[from] io::Error),
    #[error("parse config file failed: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Deserialize, Clone, Default, Debug)]
pub struct Config {
    #[serde(default, alias = "Addr")]
    pub addr: String,

    #[serde(default, alias = "ServerName")]
    pub server_name: String,

    #[serde(default, alias = "MaxHeaderSize")]
    pub max_header_size: BytesSize,

    #[serde(default, alias = "MaxBodySize")]
    pub max_body_size: BytesSize,

    #[serde(default, alias = "Logging", alias = "Log", alias = "log")]
    pub logging: LoggingConfig,

    #[serde(skip)]
    pub(crate) max_header_bytes: usize,

    #[serde(skip)]
    pub(crate) max_body_bytes: u64,
}

impl Config {
    pub fn load(fp: &str) -> Result<Self, ConfigError> {
        let txt = std::fs::read_to_string(fp)?;
        Self::parse(&txt)
    }

    pub fn parse(txt: &str) -> Result<Self, ConfigError> {
        let mut config = toml::from_str::<Self>(txt)?;
        config.autofix();
        Ok(config)
    }

    pub fn autofix(&mut self) {
        self.addr = self.addr.trim().to_string();
        if self.server_name.is_empty() {
            self.server_name = "safehttp.rs".to_string();
        }
        if self.max_header_size.0 < 1 {
            self.max_header_size = BytesSize(16 * 1024); // 16KB
        }
        if self.max_body_size.0 < 1 {
            self.max_body_size = BytesSize(10 * 1024 * 1024); // 10MB
        }
        self.max_header_bytes = self.max_header_size.0;
        self.max_body_bytes = self.max_body_size.u64();
        self.logging.autofix();
    }

    /// Merges the command line into the file config.
    pub fn with_args(mut self, args: &Args) -> Self {
        if self.addr.is_empty() {
            self.addr = args.addr.clone();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Config};
    use crate::config::bytes_size::BytesSize;

    #[test]
    fn parse_with_aliases() {
        let config = Config::parse(
            r#"
ServerName = "demo"
MaxHeaderSize = "4kb"

[Logging]
Level = "debug"
Renderer = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.server_name, "demo");
        assert_eq!(config.max_header_bytes, 4096);
        assert_eq!(config.max_body_size, BytesSize(10 * 1024 * 1024));
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.logging.renderer, "json");
    }

    #[test]
    fn defaults_and_args() {
        let mut config = Config::default();
        config.autofix();
        assert_eq!(config.server_name, "safehttp.rs");
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
        assert_eq!(config.logging.renderer, "colorful");

        let args = Args::parse_from(["safehttpd", "--addr", "0.0.0.0:9000"]);
        assert_eq!(args.file, "");
        let config = config.with_args(&args);
        assert_eq!(config.addr, "0.0.0.0:9000");

        let config = Config::parse("addr = \"127.0.0.1:1\"").unwrap().with_args(&args);
        assert_eq!(config.addr, "127.0.0.1:1");
    }

    #[test]
    fn bad_file() {
        assert!(Config::parse("addr = [").is_err());
        assert!(Config::load("/nonexistent/safehttp.toml").is_err());
    }
}
