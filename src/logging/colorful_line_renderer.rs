use serde_json::Value;

use crate::utils::time;

use super::{Color, ColorScheme, Item, Renderer};

fn with_color(buf: &mut Vec<u8>, txt: &str, color: &Option<Color>) {
    match color {
        Some(color) => color.paint(buf, txt),
        None => buf.extend(txt.as_bytes()),
    }
}

#[derive(Default)]
pub struct ColorfulLineRenderer {
    scheme: ColorScheme,
    timelayout: String,
}

impl ColorfulLineRenderer {
    pub fn new(timelayout: &str) -> Self {
        Self {
            scheme: ColorScheme::default(),
            timelayout: timelayout.to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

impl Renderer for ColorfulLineRenderer {
    fn name(&self) -> &str {
        "ColorfulLineRenderer"
    }

    fn render(&self, item: &Item, buf: &mut Vec<u8>) {
        let level = match self.scheme.levels.as_ref() {
            Some(colors) => colors.get(item.level),
            None => None,
        };
        with_color(buf, &format!("[{}]", item.level.as_str()), &level);
        buf.push(b' ');

        with_color(buf, &time::fmtlocal(item.time, &self.timelayout), &self.scheme.time);

        buf.extend(b" (");
        with_color(buf, item.file, &self.scheme.file);
        buf.push(b':');
        with_color(buf, &item.line.to_string(), &self.scheme.line);
        buf.extend(b") ");

        with_color(buf, &item.msg, &level);

        if item.kvs.is_empty() {
            buf.extend(b"\n");
            return;
        }

        buf.extend(b" { ");
        let last = item.kvs.len() - 1;
        for (idx, (k, v)) in item.kvs.iter().enumerate() {
            with_color(buf, k, &self.scheme.key);
            buf.extend(b": ");
            match v {
                Value::String(s) => with_color(buf, s, &self.scheme.value),
                other => with_color(buf, &other.to_string(), &self.scheme.value),
            }
            if idx != last {
                buf.extend(b", ");
            }
        }
        buf.extend(b" }\n");
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use serde_json::json;

    use super::ColorfulLineRenderer;
    use crate::logging::{ColorScheme, Item, Renderer};

    #[test]
    fn plain_line() {
        let item = Item {
            time: SystemTime::now(),
            level: log::Level::Warn,
            target: "safehttp".to_string(),
            file: "src/writer.rs",
            line: 12,
            msg: "server_error called with a non 5xx status".to_string(),
            kvs: smallvec::smallvec![("status".to_string(), json!(404))],
        };
        let r = ColorfulLineRenderer::new("%H").with_scheme(ColorScheme::plain());
        let mut buf = vec![];
        r.render(&item, &mut buf);
        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with("[WARN] "));
        assert!(line.ends_with(" (src/writer.rs:12) server_error called with a non 5xx status { status: 404 }\n"));
    }
}
