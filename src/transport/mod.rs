use std::io;

use crate::error::ReleaseError;
use crate::header::HeaderMap;
use crate::status::StatusCode;

mod http11;
mod recorder;

pub use http11::HttpTransport;
pub use recorder::{Event, Recorder};

mod sealed {
    /// Unforgeable outside this crate. Every committing [`super::Transport`]
    /// method takes one, so only the commit gate can reach them.
    #[derive(Debug, Clone, Copy)]
    pub struct GateKey(pub(crate) ());
}

pub(crate) use sealed::GateKey;

pub(crate) const KEY: GateKey = GateKey(());

/// The raw response channel to the client.
///
/// Headers may be changed until [`Transport::write_status`] commits the
/// response, afterwards only body bytes are accepted. Handlers never see a
/// transport directly, it is owned by a [`crate::ResponseWriter`] and only
/// reachable through the commit gate.
///
/// Code outside this crate can inspect a transport but never commit to it:
///
/// ```compile_fail
/// use safehttp::{HttpTransport, StatusCode, Transport};
///
/// let mut t = HttpTransport::new("x");
/// t.write_status(safehttp::transport::sealed::GateKey(()), StatusCode::OK);
/// ```
pub trait Transport: Send {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// The committed status, `None` until the status line is written.
    fn status(&self) -> Option<StatusCode>;

    /// Commits the headers and the status line. Must fail with
    /// [`ReleaseError::AlreadyCommitted`] on every call after the first.
    fn write_status(&mut self, key: GateKey, status: StatusCode) -> Result<(), ReleaseError>;

    /// Must fail before the status line is written.
    fn write_body(&mut self, key: GateKey, buf: &[u8]) -> io::Result<usize>;
}

pub(crate) fn body_before_status() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "body written before the status line",
    )
}
