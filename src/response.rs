use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::status::StatusCode;

pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Prepended to every json body so the response can not be included as a
/// script by a third party site.
pub const JSON_XSSI_PREFIX: &str = ")]}',\n";

pub(crate) fn escape_html_into(out: &mut String, txt: &str) {
    for c in txt.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

pub fn escape_html(txt: &str) -> String {
    let mut out = String::with_capacity(txt.len());
    escape_html_into(&mut out, txt);
    out
}

/// HTML that is safe to send by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    /// Escapes `txt` so it renders as text.
    pub fn escape(txt: &str) -> Self {
        Self(escape_html(txt))
    }

    /// Markup written by the application author. Only string literals are
    /// accepted.
    pub fn from_constant(html: &'static str) -> Self {
        Self(html.to_string())
    }

    pub fn concat(mut self, other: &SafeHtml) -> Self {
        self.0.push_str(&other.0);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SafeHtml {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Html(SafeHtml),
    Json(serde_json::Value),
    Text(String),
    NoContent,
}

/// A value a dispatcher knows how to render. Status and content type follow
/// from the kind of value, never from caller supplied strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    body: Body,
}

impl Response {
    pub fn html(html: SafeHtml) -> Self {
        Self {
            status: StatusCode::OK,
            body: Body::Html(html),
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Body::Json(value),
        }
    }

    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::json(serde_json::to_value(value)?))
    }

    pub fn text(txt: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Body::Text(txt.into()),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Body::NoContent,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Not sent for statuses that can not carry a body.
    pub fn content_type(&self) -> &'static str {
        match self.body {
            Body::Html(_) => CONTENT_TYPE_HTML,
            Body::Json(_) => CONTENT_TYPE_JSON,
            Body::Text(_) | Body::NoContent => CONTENT_TYPE_TEXT,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{escape_html, Response, SafeHtml, CONTENT_TYPE_HTML, CONTENT_TYPE_JSON};
    use crate::status::StatusCode;

    #[test]
    fn escaping() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        let html = SafeHtml::from_constant("<b>").concat(&SafeHtml::escape("<i>"));
        assert_eq!(html.as_str(), "<b>&lt;i&gt;");
    }

    #[test]
    fn status_and_content_type_follow_the_value() {
        let resp = Response::html(SafeHtml::escape("hi"));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.content_type(), CONTENT_TYPE_HTML);

        let resp = Response::to_json(&json!({"a": 1}))
            .unwrap()
            .with_status(StatusCode::CREATED);
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.content_type(), CONTENT_TYPE_JSON);

        assert_eq!(Response::no_content().status(), StatusCode::NO_CONTENT);
    }
}
