use std::io::Write;

use thiserror::Error;

use crate::config::logging::LoggingConfig;

mod color;
mod colorful_line_renderer;
mod item;
mod json_line_renderer;

pub use color::{Color, ColorScheme, LevelColors};
pub use colorful_line_renderer::ColorfulLineRenderer;
pub use item::Item;
pub use json_line_renderer::JsonLineRenderer;

pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, item: &Item, buf: &mut Vec<u8>);
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log line renderer name(`json`, `colorful`), `{0}`")]
    UnknownRenderer(String),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

pub fn renderer(name: &str, timelayout: &str) -> Result<Box<dyn Renderer>, LoggingError> {
    match name.to_lowercase().trim() {
        "color" | "colored" | "colorful" | "colorfullinerenderer" => {
            Ok(Box::new(ColorfulLineRenderer::new(timelayout)))
        }
        "" | "json" | "jsonlinerenderer" => Ok(Box::new(JsonLineRenderer::new(timelayout))),
        _ => Err(LoggingError::UnknownRenderer(name.to_string())),
    }
}

/// Writes every enabled record as one rendered line to stdout.
struct ConsoleLogger {
    level: log::LevelFilter,
    renderer: Box<dyn Renderer>,
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let item = Item::from(record);
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        self.renderer.render(&item, &mut buf);
        let mut out = std::io::stdout().lock();
        _ = out.write_all(&buf);
    }

    fn flush(&self) {
        _ = std::io::stdout().flush();
    }
}

/// Installs the process wide logger. Can only succeed once.
pub fn init(cfg: &LoggingConfig) -> Result<(), LoggingError> {
    let level = cfg.level_filter();
    if level == log::LevelFilter::Off {
        log::set_max_level(level);
        return Ok(());
    }

    let renderer = renderer(&cfg.renderer, &cfg.timelayout)?;
    log::set_boxed_logger(Box::new(ConsoleLogger { level, renderer }))?;
    log::set_max_level(level);
    Ok(())
}
