use std::io;

use crate::error::ReleaseError;
use crate::header;
use crate::status::StatusCode;
use crate::transport::{Transport, KEY};

/// Holds the transport of a response until a status code and a content type
/// are provided.
///
/// A fresh container is handed to the [`crate::Dispatcher`] for every write.
/// [`ResponseWriterContainer::release`] takes the container by value, so a
/// container can release its transport at most once.
pub struct ResponseWriterContainer<'a> {
    w: &'a mut dyn Transport,
}

impl<'a> ResponseWriterContainer<'a> {
    pub(crate) fn new(w: &'a mut dyn Transport) -> Self {
        Self { w }
    }

    /// Writes the content type and the status line, then hands out the body
    /// writer. Statuses that can not carry a body (`1xx`, `204`, `304`) are
    /// sent without a content type.
    pub fn release(
        self,
        status: StatusCode,
        content_type: &str,
    ) -> Result<BodyWriter<'a>, ReleaseError> {
        if self.w.status().is_some() {
            return Err(ReleaseError::AlreadyCommitted);
        }
        if content_type.is_empty() || !header::is_valid_value(content_type) {
            return Err(ReleaseError::InvalidContentType(content_type.to_string()));
        }

        if status.allows_body() {
            self.w.headers_mut().set("Content-Type", content_type);
        }
        self.w.write_status(KEY, status)?;
        log::trace!(status = status.as_u16(), content_type = content_type; "response released");
        Ok(BodyWriter { w: self.w })
    }
}

/// Body sink of a released response.
pub struct BodyWriter<'a> {
    w: &'a mut dyn Transport,
}

impl BodyWriter<'_> {
    pub fn status(&self) -> Option<StatusCode> {
        self.w.status()
    }
}

impl io::Write for BodyWriter<'_> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.w.write_body(KEY, buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::ResponseWriterContainer;
    use crate::error::ReleaseError;
    use crate::status::StatusCode;
    use crate::transport::{Event, Recorder, Transport, KEY};

    #[test]
    fn release_orders_content_type_status_body() {
        let mut rec = Recorder::new();
        let gate = ResponseWriterContainer::new(&mut rec);
        let mut w = gate.release(StatusCode::OK, "text/plain").unwrap();
        assert_eq!(w.status(), Some(StatusCode::OK));
        w.write_all(b"body").unwrap();

        assert_eq!(
            rec.events(),
            &[
                Event::Headers(vec![("Content-Type".to_string(), "text/plain".to_string())]),
                Event::Status(StatusCode::OK),
                Event::Body(b"body".to_vec()),
            ]
        );
        assert_eq!(rec.commits(), 1);
    }

    #[test]
    fn bodiless_status_has_no_content_type() {
        for status in [StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED] {
            let mut rec = Recorder::new();
            let gate = ResponseWriterContainer::new(&mut rec);
            gate.release(status, "text/plain").unwrap();
            assert_eq!(rec.events()[0], Event::Headers(vec![]));
            assert!(rec.committed_header("content-type").is_none());
            assert_eq!(rec.status(), Some(status));
        }

        let mut rec = Recorder::new();
        let gate = ResponseWriterContainer::new(&mut rec);
        assert!(gate.release(StatusCode::NO_CONTENT, "").is_err());
        assert_eq!(rec.commits(), 0);
    }

    #[test]
    fn release_on_committed_transport_fails() {
        let mut rec = Recorder::new();
        rec.write_status(KEY, StatusCode::OK).unwrap();
        let gate = ResponseWriterContainer::new(&mut rec);
        assert_eq!(
            gate.release(StatusCode::NOT_FOUND, "text/plain").err(),
            Some(ReleaseError::AlreadyCommitted)
        );
        assert_eq!(rec.commits(), 1);
    }

    #[test]
    fn release_rejects_bad_content_type() {
        let mut rec = Recorder::new();
        let gate = ResponseWriterContainer::new(&mut rec);
        assert_eq!(
            gate.release(StatusCode::OK, "text/html\r\nX-Injected: 1").err(),
            Some(ReleaseError::InvalidContentType("text/html\r\nX-Injected: 1".to_string()))
        );
        assert_eq!(rec.commits(), 0);
        assert!(!rec.headers().contains("content-type"));
    }
}
