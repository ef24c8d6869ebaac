//! Response writing that keeps handlers away from raw output.
//!
//! A handler only ever sees a [`ResponseWriter`]. It may edit headers until
//! the response is committed, and it commits by picking exactly one of
//! [`ResponseWriter::write`], [`ResponseWriter::write_template`],
//! [`ResponseWriter::server_error`] or [`ResponseWriter::redirect`]. The
//! configured [`Dispatcher`] turns the value into bytes, passing through the
//! [`ResponseWriterContainer`] gate that writes the content type and status
//! before any body byte.

pub mod config;
pub mod container;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod header;
pub mod logging;
pub mod request;
pub mod response;
pub mod serve;
pub mod status;
pub mod template;
pub mod transport;
pub mod utils;
pub mod writer;

pub use container::{BodyWriter, ResponseWriterContainer};
pub use dispatcher::{DefaultDispatcher, Dispatcher, RawDispatcher};
pub use error::{
    DispatchError, HeaderError, InvalidStatusCode, ReleaseError, ResponseError, TemplateError,
};
pub use handler::{Handler, HandlerResult};
pub use header::{DefaultPolicy, Header, HeaderMap, HeaderPolicy};
pub use request::IncomingRequest;
pub use response::{Body, Response, SafeHtml};
pub use serve::Server;
pub use status::StatusCode;
pub use template::{Template, TextTemplate};
pub use transport::{Event, HttpTransport, Recorder, Transport};
pub use writer::{Responded, ResponseWriter};
