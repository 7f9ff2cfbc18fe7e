//! Minimal HTTP/1.1 framing: one request per connection.
//!
//! Only what the render endpoint needs: a request line, headers and an
//! optional `Content-Length` body in, a status line, headers and a body out.
//! Chunked bodies and keep-alive are not supported.

use crate::error::{Result, ServerError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Limit on the request line plus all headers.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Path without the query string, still percent-encoded.
    pub path: String,
    /// Raw query string (after `?`), if present.
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Reads one request. Bodies larger than `max_body` are refused before they
/// are read.
pub async fn read_request<R>(reader: &mut R, max_body: usize) -> Result<HttpRequest>
where
    R: AsyncBufRead + Unpin,
{
    let mut budget = MAX_HEAD_BYTES;

    let request_line = read_line(reader, &mut budget).await?;
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed(format!("bad request line '{}'", request_line)));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(malformed(format!("unsupported version '{}'", version)));
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };

    let mut headers = Vec::new();
    loop {
        let line = read_line(reader, &mut budget).await?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(malformed(format!("bad header line '{}'", line)));
        };
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let mut request = HttpRequest {
        method: method.to_string(),
        path,
        query,
        headers,
        body: Vec::new(),
    };

    if request
        .header("transfer-encoding")
        .is_some_and(|te| !te.eq_ignore_ascii_case("identity"))
    {
        return Err(malformed("chunked bodies are not supported"));
    }

    if let Some(length) = request.header("content-length") {
        let size: usize = length
            .parse()
            .map_err(|_| malformed(format!("bad Content-Length '{}'", length)))?;
        if size > max_body {
            return Err(ServerError::BodyTooLarge {
                size,
                limit: max_body,
            });
        }
        let mut body = vec![0u8; size];
        reader.read_exact(&mut body).await?;
        request.body = body;
    }

    Ok(request)
}

async fn read_line<R>(reader: &mut R, budget: &mut usize) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = (&mut *reader)
        .take(*budget as u64)
        .read_line(&mut line)
        .await?;

    if read == 0 {
        return Err(malformed("connection closed before end of headers"));
    }
    if !line.ends_with('\n') {
        return Err(malformed("request head too large"));
    }

    *budget -= read;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn malformed(msg: impl Into<String>) -> ServerError {
    ServerError::MalformedRequest(msg.into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type),
            body,
        }
    }

    /// Error response with no body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "",
        }
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n",
            self.status,
            self.reason(),
            self.body.len()
        );
        if let Some(content_type) = self.content_type {
            head.push_str("Content-Type: ");
            head.push_str(content_type);
            head.push_str("\r\n");
        }
        head.push_str("Connection: close\r\n\r\n");

        writer.write_all(head.as_bytes()).await?;
        writer.write_all(&self.body).await?;
        writer.flush().await
    }
}
