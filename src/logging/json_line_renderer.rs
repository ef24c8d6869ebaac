use serde_json::{Map, Value};

use crate::utils::time;

use super::{Item, Renderer};

#[derive(Debug, Default)]
pub struct JsonLineRenderer {
    timelayout: String,
}

impl JsonLineRenderer {
    pub fn new(timelayout: &str) -> Self {
        let timelayout = if timelayout.is_empty() {
            "%Y-%m-%d %H:%M:%S%.6f %:z"
        } else {
            timelayout
        };
        Self {
            timelayout: timelayout.to_string(),
        }
    }
}

impl Renderer for JsonLineRenderer {
    fn name(&self) -> &str {
        "JsonLineRenderer"
    }

    fn render(&self, item: &Item, buf: &mut Vec<u8>) {
        let mut obj = Map::new();
        obj.insert("level".to_string(), Value::from(item.level.as_str()));
        obj.insert(
            "time".to_string(),
            Value::from(time::fmtlocal(item.time, &self.timelayout)),
        );
        if !item.target.is_empty() {
            obj.insert("target".to_string(), Value::from(item.target.as_str()));
        }
        obj.insert(
            "lineno".to_string(),
            Value::from(format!("{}:{}", item.file, item.line)),
        );
        obj.insert("message".to_string(), Value::from(item.msg.as_str()));

        if !item.kvs.is_empty() {
            let kvs: Map<String, Value> = item.kvs.iter().cloned().collect();
            obj.insert("kvs".to_string(), Value::Object(kvs));
        }

        if serde_json::to_writer(&mut *buf, &obj).is_ok() {
            buf.push(b'\n');
        }
    }
}
