use std::io;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::TemplateError;
use crate::response::{escape_html_into, CONTENT_TYPE_HTML};

/// Renderer collaborator executed by a [`crate::Dispatcher`].
pub trait Template: Send + Sync {
    fn name(&self) -> &str;

    fn content_type(&self) -> &str {
        CONTENT_TYPE_HTML
    }

    fn render(&self, data: &Value, out: &mut dyn io::Write) -> Result<(), TemplateError>;
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}").unwrap());

/// Replaces `{{ key }}` and `{{ key.nested }}` with the HTML escaped value
/// found in the data.
#[derive(Debug, Clone)]
pub struct TextTemplate {
    name: String,
    source: String,
}

impl TextTemplate {
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
        }
    }

    fn lookup<'v>(data: &'v Value, path: &str) -> Option<&'v Value> {
        let mut cur = data;
        for key in path.split('.') {
            cur = match cur {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }
}

impl Template for TextTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, data: &Value, out: &mut dyn io::Write) -> Result<(), TemplateError> {
        let mut buf = String::with_capacity(self.source.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&self.source) {
            let (whole, key) = match (caps.get(0), caps.get(1)) {
                (Some(whole), Some(key)) => (whole, key.as_str()),
                _ => continue,
            };
            buf.push_str(&self.source[last..whole.start()]);
            last = whole.end();

            match Self::lookup(data, key) {
                None => {
                    return Err(TemplateError::MissingKey {
                        template: self.name.clone(),
                        key: key.to_string(),
                    });
                }
                Some(Value::Null) => {}
                Some(Value::String(s)) => escape_html_into(&mut buf, s),
                Some(other) => escape_html_into(&mut buf, &other.to_string()),
            }
        }
        buf.push_str(&self.source[last..]);
        out.write_all(buf.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Template, TextTemplate};
    use crate::error::TemplateError;

    #[test]
    fn render_placeholders() {
        let t = TextTemplate::new("hello", "<p>Hi {{ user.name }}, you have {{count}} items{{ none }}</p>");
        let mut out = vec![];
        t.render(
            &json!({"user": {"name": "<script>"}, "count": 3, "none": null}),
            &mut out,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<p>Hi &lt;script&gt;, you have 3 items</p>"
        );
    }

    #[test]
    fn missing_key() {
        let t = TextTemplate::new("t", "{{ a }} {{ b }}");
        let mut out = vec![];
        match t.render(&json!({"a": 1}), &mut out) {
            Err(TemplateError::MissingKey { template, key }) => {
                assert_eq!(template, "t");
                assert_eq!(key, "b");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(out.is_empty());
    }
}
