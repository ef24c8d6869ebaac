use std::io;

use crate::error::ReleaseError;
use crate::header::HeaderMap;
use crate::status::StatusCode;

use super::{body_before_status, GateKey, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Snapshot of the headers taken at commit time.
    Headers(Vec<(String, String)>),
    Status(StatusCode),
    Body(Vec<u8>),
}

/// Transport that keeps an ordered log of everything written to it.
///
/// Protocol violations (a second status line, body bytes before the status
/// line) are rejected like any transport would, and counted so tests can
/// assert on them.
#[derive(Debug, Default)]
pub struct Recorder {
    header: HeaderMap,
    status: Option<StatusCode>,
    events: Vec<Event>,
    commits: usize,
    violations: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of accepted status lines, at most one.
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn body(&self) -> Vec<u8> {
        let mut out = vec![];
        for event in self.events.iter() {
            if let Event::Body(chunk) = event {
                out.extend_from_slice(chunk);
            }
        }
        out
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body()).to_string()
    }

    /// Headers as they were when the response was committed.
    pub fn committed_headers(&self) -> Option<&[(String, String)]> {
        self.events.iter().find_map(|e| match e {
            Event::Headers(hs) => Some(hs.as_slice()),
            _ => None,
        })
    }

    pub fn committed_header(&self, name: &str) -> Option<&str> {
        self.committed_headers()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl Transport for Recorder {
    fn headers(&self) -> &HeaderMap {
        &self.header
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.header
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn write_status(&mut self, _: GateKey, status: StatusCode) -> Result<(), ReleaseError> {
        if self.status.is_some() {
            self.violations += 1;
            return Err(ReleaseError::AlreadyCommitted);
        }
        let snapshot = self
            .header
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.events.push(Event::Headers(snapshot));
        self.events.push(Event::Status(status));
        self.status = Some(status);
        self.commits += 1;
        Ok(())
    }

    fn write_body(&mut self, _: GateKey, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.violations += 1;
            return Err(body_before_status());
        }
        if !buf.is_empty() {
            self.events.push(Event::Body(buf.to_vec()));
        }
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, Recorder};
    use crate::error::ReleaseError;
    use crate::status::StatusCode;
    use crate::transport::{Transport, KEY};

    #[test]
    fn records_in_order() {
        let mut rec = Recorder::new();
        rec.headers_mut().set("X-A", "1");
        rec.write_status(KEY, StatusCode::OK).unwrap();
        rec.write_body(KEY, b"ab").unwrap();
        rec.write_body(KEY, b"c").unwrap();

        assert_eq!(
            rec.events(),
            &[
                Event::Headers(vec![("X-A".to_string(), "1".to_string())]),
                Event::Status(StatusCode::OK),
                Event::Body(b"ab".to_vec()),
                Event::Body(b"c".to_vec()),
            ]
        );
        assert_eq!(rec.body_string(), "abc");
        assert_eq!(rec.committed_header("x-a"), Some("1"));
    }

    #[test]
    fn rejects_violations() {
        let mut rec = Recorder::new();
        assert!(rec.write_body(KEY, b"early").is_err());
        rec.write_status(KEY, StatusCode::OK).unwrap();
        assert_eq!(
            rec.write_status(KEY, StatusCode::NOT_FOUND),
            Err(ReleaseError::AlreadyCommitted)
        );
        assert_eq!(rec.commits(), 1);
        assert_eq!(rec.violations(), 2);
        assert_eq!(rec.status(), Some(StatusCode::OK));
    }
}
