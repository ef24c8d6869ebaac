use std::str::FromStr;

use serde::Deserialize;

#[derive(Deserialize, Clone, Default, Debug)]
pub struct LoggingConfig {
    #[serde(default, alias = "Disable")]
    pub disable: bool,

    #[serde(default, alias = "Level")]
    pub level: String,

    #[serde(default, alias = "Renderer", alias = "RendererName", alias = "renderer_name")]
    pub renderer: String,

    #[serde(default, alias = "TimeLayout")]
    pub timelayout: String,
}

impl LoggingConfig {
    pub fn autofix(&mut self) {
        if self.level.trim().is_empty() {
            self.level = "info".to_string();
        }
        if self.renderer.trim().is_empty() {
            self.renderer = "colorful".to_string();
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        if self.disable {
            return log::LevelFilter::Off;
        }
        match log::LevelFilter::from_str(self.level.trim()) {
            Ok(level) => level,
            Err(_) => log::LevelFilter::Info,
        }
    }
}
