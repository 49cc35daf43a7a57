use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

pub mod api;
pub mod routes;

use api::ApiContext;

pub const BIND_ENV: &str = "MCFORECAST_BIND";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const MAX_HEADER_BYTES: usize = 16_384;
pub const MAX_BODY_BYTES: usize = 65_536;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug)]
pub enum RequestError {
    Io(io::Error),
    Malformed(String),
    TooLarge { limit: usize },
    IncompleteBody { expected: usize, received: usize },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Malformed(m) => write!(f, "malformed request: {m}"),
            Self::TooLarge { limit } => write!(f, "request exceeds {limit} bytes"),
            Self::IncompleteBody { expected, received } => write!(
                f,
                "request body ended after {received} of {expected} declared bytes"
            ),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<io::Error> for RequestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub fn run_server(bind_addr: &str, ctx: &ApiContext) -> io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    tracing::info!(%bind_addr, dataset = %ctx.dataset.name, "mcforecast server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, ctx) {
                    tracing::warn!(%err, "request error");
                }
            }
            Err(err) => tracing::warn!(%err, "connection failed"),
        }
    }

    Ok(())
}

pub fn handle_connection(stream: &mut TcpStream, ctx: &ApiContext) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let request = {
        let mut reader = BufReader::new(&*stream);
        read_request(&mut reader)
    };

    let response = match request {
        Ok(Some(request)) => {
            let response = routes::route_request(ctx, &request.method, &request.path, &request.body);
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status_code,
                "handled request"
            );
            response
        }
        Ok(None) => return Ok(()),
        Err(RequestError::Io(err)) => return Err(err),
        Err(err) => {
            tracing::warn!(%err, "rejected request");
            routes::error_response(400, "Bad Request", &err.to_string())
        }
    };

    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()
}

/// Read the request line and headers up to the blank line, then exactly
/// `Content-Length` body bytes. `Ok(None)` means the peer closed without sending.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<HttpRequest>, RequestError> {
    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(None);
    }
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return Err(RequestError::Malformed(format!(
            "bad request line {:?}",
            request_line.trim_end()
        )));
    };
    let (method, path) = (method.to_string(), path.to_string());

    let mut header_bytes = request_line.len();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Err(RequestError::Malformed("headers ended without a blank line".to_string()));
        }
        header_bytes += read;
        if header_bytes > MAX_HEADER_BYTES {
            return Err(RequestError::TooLarge {
                limit: MAX_HEADER_BYTES,
            });
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    RequestError::Malformed(format!("bad Content-Length {:?}", value.trim()))
                })?;
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(RequestError::TooLarge {
            limit: MAX_BODY_BYTES,
        });
    }

    let mut body = Vec::with_capacity(content_length);
    match reader.take(content_length as u64).read_to_end(&mut body) {
        Ok(_) => {}
        Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
        Err(err) => return Err(RequestError::Io(err)),
    }
    if body.len() < content_length {
        return Err(RequestError::IncompleteBody {
            expected: content_length,
            received: body.len(),
        });
    }

    Ok(Some(HttpRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}
