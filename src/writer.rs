use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::container::{BodyWriter, ResponseWriterContainer};
use crate::dispatcher::Dispatcher;
use crate::error::{DispatchError, HeaderError, ResponseError};
use crate::header::{self, DefaultPolicy, Header, HeaderPolicy};
use crate::request::IncomingRequest;
use crate::response::{escape_html, Response, CONTENT_TYPE_HTML, CONTENT_TYPE_TEXT};
use crate::status::StatusCode;
use crate::template::Template;
use crate::transport::Transport;
use crate::utils::uri;

/// Marker returned by every response-producing operation: a terminal
/// response was written for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Responded;

/// The handler facing side of a response.
///
/// Handlers can change headers and pick one response-producing operation.
/// The transport itself is never handed out; bytes reach it through the
/// [`Dispatcher`] and the commit gate only. Exactly one response is
/// committed per writer, later attempts fail with
/// [`ResponseError::AlreadyCommitted`].
///
/// A writer never gives its transport back to the caller:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use safehttp::{RawDispatcher, Recorder, ResponseWriter};
///
/// let w = ResponseWriter::new(Arc::new(RawDispatcher), Recorder::new());
/// let _ = w.into_transport();
/// ```
pub struct ResponseWriter<T: Transport> {
    d: Arc<dyn Dispatcher>,
    rw: T,

    // Kept private: handlers only get the checked `Header` view.
    policy: Arc<dyn HeaderPolicy>,
}

impl<T: Transport> ResponseWriter<T> {
    pub fn new(d: Arc<dyn Dispatcher>, rw: T) -> Self {
        Self::with_policy(d, rw, Arc::new(DefaultPolicy))
    }

    pub fn with_policy(d: Arc<dyn Dispatcher>, rw: T, policy: Arc<dyn HeaderPolicy>) -> Self {
        Self { d, rw, policy }
    }

    /// Headers that will be sent with the response. They must be set before
    /// writing a response; afterwards every mutation fails with
    /// [`HeaderError::Committed`].
    pub fn header(&mut self) -> Header<'_> {
        let committed = self.rw.status().is_some();
        Header::new(self.rw.headers_mut(), committed, self.policy.as_ref())
    }

    /// The committed status, `None` while no response was written.
    pub fn committed(&self) -> Option<StatusCode> {
        self.rw.status()
    }

    /// Read access to the transport, e.g. to inspect a test recorder.
    pub fn transport(&self) -> &T {
        &self.rw
    }

    pub(crate) fn into_transport(self) -> T {
        self.rw
    }

    fn ensure_uncommitted(&self) -> Result<(), ResponseError> {
        if let Some(status) = self.rw.status() {
            log::error!(status = status.as_u16(); "response already committed, refusing to write another one");
            return Err(ResponseError::AlreadyCommitted);
        }
        Ok(())
    }

    fn check_dispatch(&self, result: Result<(), DispatchError>) -> Result<Responded, ResponseError> {
        if let Err(e) = result {
            log::error!("dispatcher failed to produce the response: {}", e);
            return Err(ResponseError::Dispatch(e));
        }
        if self.rw.status().is_none() {
            log::error!("dispatcher returned without releasing the response");
            return Err(ResponseError::NotReleased);
        }
        Ok(Responded)
    }

    /// Commits outside of the dispatcher, still through the gate.
    fn release(&mut self, status: StatusCode, content_type: &str) -> Result<BodyWriter<'_>, ResponseError> {
        let gate = ResponseWriterContainer::new(&mut self.rw);
        Ok(gate.release(status, content_type)?)
    }

    pub fn write(&mut self, resp: Response) -> Result<Responded, ResponseError> {
        self.ensure_uncommitted()?;
        let result = self
            .d
            .write(ResponseWriterContainer::new(&mut self.rw), &resp);
        self.check_dispatch(result)
    }

    pub fn write_template<D: Serialize + ?Sized>(
        &mut self,
        t: &dyn Template,
        data: &D,
    ) -> Result<Responded, ResponseError> {
        self.ensure_uncommitted()?;
        let data = serde_json::to_value(data).map_err(ResponseError::Serialize)?;
        let result = self
            .d
            .execute_template(ResponseWriterContainer::new(&mut self.rw), t, &data);
        self.check_dispatch(result)
    }

    /// Writes the standard error response for `code`, which must be a
    /// `5xx` status.
    pub fn server_error(&mut self, code: StatusCode) -> Result<Responded, ResponseError> {
        if !code.is_server_error() {
            log::warn!(status = code.as_u16(); "server_error called with a non 5xx status");
            return Err(ResponseError::NotServerError(code));
        }
        self.ensure_uncommitted()?;

        self.rw.headers_mut().set("X-Content-Type-Options", "nosniff");
        let mut w = self.release(code, CONTENT_TYPE_TEXT)?;
        w.write_all(format!("{}\n", code.reason()).as_bytes())?;
        Ok(Responded)
    }

    /// Redirects to `url` with `code`, which must be a `3xx` status. Relative
    /// urls are resolved against the path of `r`.
    pub fn redirect(
        &mut self,
        r: &IncomingRequest,
        url: &str,
        code: StatusCode,
    ) -> Result<Responded, ResponseError> {
        if !code.is_redirection() {
            log::warn!(status = code.as_u16(); "redirect called with a non 3xx status");
            return Err(ResponseError::NotRedirect(code));
        }
        self.ensure_uncommitted()?;

        let location = uri::escape_non_ascii(&uri::resolve_location(r.path(), url));
        if !header::is_valid_value(&location) {
            return Err(ResponseError::Header(HeaderError::InvalidValue(
                "Location".to_string(),
            )));
        }
        self.rw.headers_mut().set("Location", &location);

        let with_body = r.method() == "GET";
        let content_type = match r.method() {
            "GET" | "HEAD" => CONTENT_TYPE_HTML,
            _ => CONTENT_TYPE_TEXT,
        };
        let mut w = self.release(code, content_type)?;
        if with_body {
            let body = format!("<a href=\"{}\">{}</a>.\n", escape_html(&location), code.reason());
            w.write_all(body.as_bytes())?;
        }
        Ok(Responded)
    }
}
