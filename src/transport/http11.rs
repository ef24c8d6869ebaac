use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::ReleaseError;
use crate::header::HeaderMap;
use crate::status::StatusCode;
use crate::utils;

use super::{body_before_status, GateKey, Transport};

/// HTTP/1.1 transport. The response is buffered until the connection flushes
/// it with [`HttpTransport::write_to`], every connection serves one request.
#[derive(Debug)]
pub struct HttpTransport {
    header: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
    server_name: String,
}

impl HttpTransport {
    pub fn new(server_name: &str) -> Self {
        Self {
            header: HeaderMap::new(),
            status: None,
            body: Vec::with_capacity(1024),
            server_name: server_name.to_string(),
        }
    }

    /// Serializes the committed response. `with_body` is false for answers
    /// to `HEAD` requests.
    pub fn encode(&self, with_body: bool) -> io::Result<Vec<u8>> {
        let status = match self.status {
            Some(status) => status,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "no response was committed",
                ));
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(256 + self.body.len());
        buf.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", status.as_u16(), status.reason()).as_bytes());

        for (k, v) in self.header.iter() {
            buf.extend_from_slice(format!("{}: {}\r\n", k, v).as_bytes());
        }
        if status.allows_body() {
            buf.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }
        if !self.header.contains("date") {
            buf.extend_from_slice(format!("Date: {}\r\n", utils::time::http_date()).as_bytes());
        }
        if !self.header.contains("server") && !self.server_name.is_empty() {
            buf.extend_from_slice(format!("Server: {}\r\n", self.server_name).as_bytes());
        }
        buf.extend_from_slice(b"Connection: close\r\n\r\n");

        if with_body && status.allows_body() {
            buf.extend_from_slice(&self.body);
        }
        Ok(buf)
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(
        &self,
        stream: &mut W,
        with_body: bool,
    ) -> io::Result<()> {
        let buf = self.encode(with_body)?;
        stream.write_all(&buf).await?;
        stream.flush().await
    }
}

impl Transport for HttpTransport {
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
            return Err(ReleaseError::AlreadyCommitted);
        }
        self.status = Some(status);
        Ok(())
    }

    fn write_body(&mut self, _: GateKey, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            return Err(body_before_status());
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
