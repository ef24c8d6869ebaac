use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::handler::Handler;
use crate::header::{self, DefaultPolicy, HeaderPolicy};
use crate::request::IncomingRequest;
use crate::response::Response;
use crate::status::StatusCode;
use crate::transport::HttpTransport;
use crate::writer::ResponseWriter;

fn malformed(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

async fn read_line<R: AsyncBufRead + Unpin>(
    r: &mut R,
    buf: &mut String,
    limit: usize,
) -> io::Result<usize> {
    if limit == 0 {
        return Err(malformed("request header section too large"));
    }
    let n = (&mut *r).take(limit as u64).read_line(buf).await?;
    if n > 0 && !buf.ends_with('\n') {
        return Err(malformed("request header section too large or truncated"));
    }
    Ok(n)
}

/// Reads one request head. The body, if any, is read and discarded.
/// `Ok(None)` means the peer closed the connection before sending anything.
pub(crate) async fn read_request<R: AsyncBufRead + Unpin>(
    r: &mut R,
    max_header_bytes: usize,
    max_body_bytes: u64,
) -> io::Result<Option<IncomingRequest>> {
    let mut line = String::new();
    let n = read_line(r, &mut line, max_header_bytes).await?;
    if n == 0 {
        return Ok(None);
    }
    let mut total = n;

    let mut parts = line.trim_end().splitn(3, ' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) if header::is_token(m) && !t.is_empty() => (m, t, v),
        _ => return Err(malformed("bad request line")),
    };
    if !version.starts_with("HTTP/1.") {
        return Err(malformed("unsupported http version"));
    }
    let mut req = IncomingRequest::new(method, target);
    req.set_version(version);

    loop {
        line.clear();
        let n = read_line(r, &mut line, max_header_bytes.saturating_sub(total)).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        total += n;

        let txt = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if txt.is_empty() {
            break;
        }
        let (k, v) = match txt.split_once(':') {
            Some(kv) => kv,
            None => return Err(malformed("bad header line")),
        };
        if !header::is_token(k) {
            return Err(malformed("bad header name"));
        }
        req.header_mut().add(k, v.trim());
    }

    if let Some(cl) = req.header().get("content-length") {
        let size: u64 = match cl.trim().parse() {
            Ok(v) => v,
            Err(_) => return Err(malformed("bad content-length")),
        };
        if size > max_body_bytes {
            return Err(malformed("request body too large"));
        }
        let copied = tokio::io::copy(&mut (&mut *r).take(size), &mut tokio::io::sink()).await?;
        if copied < size {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
    }
    Ok(Some(req))
}

/// Accepts connections and answers one request per connection with a
/// single [`Handler`].
pub struct Server {
    config: Config,
    dispatcher: Arc<dyn Dispatcher>,
    policy: Arc<dyn HeaderPolicy>,
    handler: Arc<dyn Handler>,
    alive: AtomicI64,
}

impl Server {
    pub fn new(mut config: Config, dispatcher: Arc<dyn Dispatcher>, handler: Arc<dyn Handler>) -> Self {
        config.autofix();
        Self {
            config,
            dispatcher,
            policy: Arc::new(DefaultPolicy),
            handler,
            alive: AtomicI64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn HeaderPolicy>) -> Self {
        self.policy = policy;
        self
    }

    fn writer(&self) -> ResponseWriter<HttpTransport> {
        ResponseWriter::with_policy(
            self.dispatcher.clone(),
            HttpTransport::new(&self.config.server_name),
            self.policy.clone(),
        )
    }

    pub async fn conn<S>(&self, stream: S) -> io::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let (r, mut w) = tokio::io::split(stream);
        let mut r = BufReader::new(r);
        let mut rw = self.writer();

        let req = match read_request(
            &mut r,
            self.config.max_header_bytes,
            self.config.max_body_bytes,
        )
        .await
        {
            Ok(Some(req)) => req,
            Ok(None) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                log::debug!("malformed request, {}", e);
                if let Err(e) = rw.write(Response::text("Bad Request").with_status(StatusCode::BAD_REQUEST)) {
                    return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
                return rw.into_transport().write_to(&mut w, true).await;
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self.handler.handle(&req, &mut rw).await {
            if e.is_protocol_violation() {
                log::error!(method = req.method(), path = req.path(); "handler violated the response protocol, {}", e);
            } else {
                log::warn!(method = req.method(), path = req.path(); "handler failed, {}", e);
            }
        }
        if rw.committed().is_none() {
            log::error!(method = req.method(), path = req.path(); "no response was written");
            if let Err(e) = rw.server_error(StatusCode::INTERNAL_SERVER_ERROR) {
                return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
            }
        }

        let status = rw.committed().map_or(0, |s| s.as_u16());
        log::info!(method = req.method(), path = req.path(), status = status; "request served");
        rw.into_transport()
            .write_to(&mut w, req.method() != "HEAD")
            .await
    }

    /// Serves until `shutdown` resolves, then waits for the connections that
    /// are still alive.
    pub async fn run<F>(self: Arc<Self>, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                ar = listener.accept() => {
                    match ar {
                        Err(e) => {
                            log::debug!("accept failed, {}", e);
                            continue;
                        }
                        Ok((stream, addr)) => {
                            let server = self.clone();
                            server.alive.fetch_add(1, Ordering::SeqCst);
                            tokio::spawn(async move {
                                if let Err(e) = server.conn(stream).await {
                                    log::debug!("connection {} closed, {}", addr, e);
                                }
                                server.alive.fetch_sub(1, Ordering::SeqCst);
                            });
                        }
                    }
                }
                _ = &mut shutdown => {
                    log::info!("preparing to shutdown");
                    while self.alive.load(Ordering::SeqCst) > 0 {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    log::info!("gracefully shutdown");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

    use super::{read_request, Server};
    use crate::config::Config;
    use crate::dispatcher::DefaultDispatcher;
    use crate::handler::HandlerResult;
    use crate::request::IncomingRequest;
    use crate::response::Response;
    use crate::status::StatusCode;
    use crate::transport::HttpTransport;
    use crate::writer::ResponseWriter;

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.autofix();
        cfg
    }

    async fn roundtrip(server: Server, raw: &str) -> String {
        let (mut client, srv) = tokio::io::duplex(64 * 1024);
        client.write_all(raw.as_bytes()).await.unwrap();
        server.conn(srv).await.unwrap();
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn parses_request_head() {
        let raw = "POST /a?b=c HTTP/1.1\r\nHost: x\r\nX-Multi: 1\r\nx-multi: 2\r\nContent-Length: 3\r\n\r\nabcNEXT";
        let mut r = BufReader::new(raw.as_bytes());
        let req = read_request(&mut r, 1024, 1024).await.unwrap().unwrap();
        assert_eq!(req.method(), "POST");
        assert_eq!(req.path(), "/a");
        assert_eq!(req.query(), "b=c");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.header().get_all("x-multi"), &["1".to_string(), "2".to_string()]);

        let mut rest = String::new();
        r.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "NEXT");
    }

    #[tokio::test]
    async fn rejects_malformed_heads() {
        for raw in [
            "GARBAGE\r\n\r\n",
            "GET / SPDY/3\r\n\r\n",
            "GET / HTTP/1.1\r\nno colon\r\n\r\n",
            "GET / HTTP/1.1\r\nContent-Length: x\r\n\r\n",
        ] {
            let mut r = BufReader::new(raw.as_bytes());
            let err = read_request(&mut r, 1024, 1024).await.unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidData, "{}", raw);
        }

        let long = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(100));
        let mut r = BufReader::new(long.as_bytes());
        assert!(read_request(&mut r, 64, 0).await.is_err());

        let mut r = BufReader::new(&b""[..]);
        assert!(read_request(&mut r, 64, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn serves_handler_response() {
        let handler = |req: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>| -> HandlerResult {
            w.header().set("X-Frame-Options", "DENY")?;
            w.write(Response::text(format!("hello {}", req.path())))
        };
        let server = Server::new(config(), Arc::new(DefaultDispatcher), Arc::new(handler));
        let out = roundtrip(server, "GET /world HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(out.starts_with("HTTP/1.1 200 OK\r\nX-Frame-Options: DENY\r\nContent-Type: text/plain; charset=utf-8\r\n"));
        assert!(out.ends_with("\r\n\r\nhello /world"));
    }

    #[tokio::test]
    async fn framing_headers_stay_with_the_server() {
        let handler = |_: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>| -> HandlerResult {
            assert!(w.header().set("Connection", "keep-alive").is_err());
            w.write(Response::no_content())
        };
        let server = Server::new(config(), Arc::new(DefaultDispatcher), Arc::new(handler));
        let out = roundtrip(server, "GET / HTTP/1.1\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert_eq!(out.matches("Connection:").count(), 1);
        assert!(out.contains("Connection: close\r\n"));
        assert!(!out.contains("Content-Type"));
    }

    #[tokio::test]
    async fn silent_handler_gets_500() {
        let handler = |_: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>| -> HandlerResult {
            w.server_error(StatusCode::OK)
        };
        let server = Server::new(config(), Arc::new(DefaultDispatcher), Arc::new(handler));
        let out = roundtrip(server, "GET / HTTP/1.1\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(out.ends_with("Internal Server Error\n"));
    }

    #[tokio::test]
    async fn head_and_bad_requests() {
        let handler = |_: &IncomingRequest, w: &mut ResponseWriter<HttpTransport>| -> HandlerResult {
            w.write(Response::text("body"))
        };
        let server = Server::new(config(), Arc::new(DefaultDispatcher), Arc::new(handler));
        let out = roundtrip(server, "HEAD / HTTP/1.1\r\n\r\n").await;
        assert!(out.contains("Content-Length: 4\r\n"));
        assert!(out.ends_with("\r\n\r\n"));

        let server = Server::new(config(), Arc::new(DefaultDispatcher), Arc::new(handler));
        let out = roundtrip(server, "NOT A REQUEST\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }
}
