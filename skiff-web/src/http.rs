//! Minimal HTTP/1.1 wire handling.
//!
//! Request side: exactly one request line is read per connection and parsed
//! into a [`RawRequest`]; routing happens on the percent-decoded path via
//! the tagged [`Route`] enum, evaluated as an ordered prefix table instead
//! of string branching scattered through handlers. Response side: small
//! writers emitting the fixed header set every response carries.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reserved first segment of a listing sub-path requesting the forced
/// full-storage view while shared items are configured.
pub const STORAGE_ESCAPE_SEGMENT: &str = "__storage__";

const CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// A parsed request line, method and target only.
///
/// Headers and body are never read: the surface is GET-only and the
/// connection closes after one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub target: String,
}

/// Parses `METHOD SP TARGET [SP VERSION]`.
///
/// Fewer than two tokens means the line is malformed and the connection
/// must close without a response.
pub fn parse_request_line(line: &str) -> Option<RawRequest> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    Some(RawRequest {
        method: method.to_string(),
        target: target.to_string(),
    })
}

/// Routing decision for one percent-decoded request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Static browser page.
    Page,
    /// Server metadata JSON.
    Info,
    /// JSON listing for a sub-path (empty = root), with the forced
    /// full-storage flag already extracted from the escape segment.
    Listing { forced: bool, sub_path: String },
    /// Streamed download of a shared item or root-relative file.
    Download { identifier: String },
    /// Anything else.
    NotFound,
}

impl Route {
    /// Matches the decoded path top-to-bottom against the route table.
    pub fn parse(path: &str) -> Route {
        match path {
            "/" | "/files" => return Route::Page,
            "/api/info" => return Route::Info,
            _ => {}
        }

        if let Some(rest) = path.strip_prefix("/api/files") {
            let sub_path = rest.strip_prefix('/').unwrap_or(rest);
            let (forced, sub_path) = strip_escape_segment(sub_path);
            return Route::Listing {
                forced,
                sub_path: sub_path.to_string(),
            };
        }

        if let Some(identifier) = path.strip_prefix("/download/") {
            return Route::Download {
                identifier: identifier.to_string(),
            };
        }

        Route::NotFound
    }
}

/// Splits off a leading `__storage__` segment, if present.
fn strip_escape_segment(sub_path: &str) -> (bool, &str) {
    if sub_path == STORAGE_ESCAPE_SEGMENT {
        (true, "")
    } else if let Some(rest) = sub_path.strip_prefix(STORAGE_ESCAPE_SEGMENT)
        && let Some(rest) = rest.strip_prefix('/')
    {
        (true, rest)
    } else {
        (false, sub_path)
    }
}

/// Writes a complete response with a known body.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: &str,
    content_type: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Cache-Control: {CACHE_CONTROL}\r\n\
         Connection: close\r\n\
         \r\n",
        body.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await
}

/// Writes an empty-bodied 404.
pub async fn write_not_found<W: AsyncWrite + Unpin>(writer: &mut W) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 404 Not Found\r\n\
         Content-Length: 0\r\n\
         Cache-Control: {CACHE_CONTROL}\r\n\
         Connection: close\r\n\
         \r\n"
    );
    writer.write_all(head.as_bytes()).await?;
    writer.flush().await
}

/// Writes the header block of a streamed download.
///
/// `Content-Length` is emitted only when the length is known; shared items
/// stream without one and clients detect truncation from its absence.
pub async fn write_download_headers<W: AsyncWrite + Unpin>(
    writer: &mut W,
    disposition: &str,
    content_length: Option<u64>,
) -> std::io::Result<()> {
    let mut head = String::from("HTTP/1.1 200 OK\r\n");
    head.push_str("Content-Type: application/octet-stream\r\n");
    head.push_str(&format!("Content-Disposition: {disposition}\r\n"));
    if let Some(length) = content_length {
        head.push_str(&format!("Content-Length: {length}\r\n"));
    }
    head.push_str(&format!("Cache-Control: {CACHE_CONTROL}\r\n"));
    head.push_str("Connection: close\r\n\r\n");
    writer.write_all(head.as_bytes()).await
}
