use std::io::Write;

use serde_json::Value;

use crate::container::ResponseWriterContainer;
use crate::error::DispatchError;
use crate::response::{Body, Response, JSON_XSSI_PREFIX};
use crate::status::StatusCode;
use crate::template::Template;

/// Output strategy of a [`crate::ResponseWriter`].
///
/// Implementations must call [`ResponseWriterContainer::release`] exactly
/// once, with a status and a content type derived from the value being
/// rendered, and write body bytes only to the writer it returns.
pub trait Dispatcher: Send + Sync {
    fn write(&self, c: ResponseWriterContainer<'_>, resp: &Response) -> Result<(), DispatchError>;

    fn execute_template(
        &self,
        c: ResponseWriterContainer<'_>,
        t: &dyn Template,
        data: &Value,
    ) -> Result<(), DispatchError>;
}

/// Encodes everything before releasing, a failed encoding commits nothing.
fn write_response(c: ResponseWriterContainer<'_>, resp: &Response) -> Result<(), DispatchError> {
    let body: Vec<u8> = match resp.body() {
        Body::Html(html) => html.as_str().as_bytes().to_vec(),
        Body::Text(txt) => txt.as_bytes().to_vec(),
        Body::Json(value) => {
            let mut buf = JSON_XSSI_PREFIX.as_bytes().to_vec();
            serde_json::to_writer(&mut buf, value)?;
            buf
        }
        Body::NoContent => vec![],
    };

    let mut w = c.release(resp.status(), resp.content_type())?;
    if !body.is_empty() && resp.status().allows_body() {
        w.write_all(&body)?;
    }
    Ok(())
}

/// Writes [`Response`] values and refuses to execute templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDispatcher;

impl Dispatcher for RawDispatcher {
    fn write(&self, c: ResponseWriterContainer<'_>, resp: &Response) -> Result<(), DispatchError> {
        write_response(c, resp)
    }

    fn execute_template(
        &self,
        _: ResponseWriterContainer<'_>,
        t: &dyn Template,
        _: &Value,
    ) -> Result<(), DispatchError> {
        log::warn!(template = t.name(); "template execution is not supported by the raw dispatcher");
        Err(DispatchError::TemplatesUnsupported)
    }
}

/// Writes [`Response`] values and executes templates.
///
/// Templates are rendered into memory first; a template that fails halfway
/// leaves the response uncommitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDispatcher;

impl Dispatcher for DefaultDispatcher {
    fn write(&self, c: ResponseWriterContainer<'_>, resp: &Response) -> Result<(), DispatchError> {
        write_response(c, resp)
    }

    fn execute_template(
        &self,
        c: ResponseWriterContainer<'_>,
        t: &dyn Template,
        data: &Value,
    ) -> Result<(), DispatchError> {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        t.render(data, &mut buf)?;

        let mut w = c.release(StatusCode::OK, t.content_type())?;
        w.write_all(&buf)?;
        Ok(())
    }
}
