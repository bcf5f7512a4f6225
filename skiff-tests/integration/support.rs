//! Shared helpers: a minimal raw HTTP client and response splitter.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A fully read, parsed HTTP response.
#[derive(Debug)]
pub struct Response {
    pub status_line: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn status_code(&self) -> &str {
        self.status_line.split(' ').nth(1).unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not valid JSON")
    }
}

/// Sends one GET and reads the connection to EOF (the server always closes
/// after a single response).
pub async fn get(addr: SocketAddr, target: &str) -> Response {
    let raw = send_raw(addr, format!("GET {target} HTTP/1.1\r\n\r\n").as_bytes()).await;
    parse_response(&raw)
}

/// Sends arbitrary bytes and returns everything the server wrote back.
pub async fn send_raw(addr: SocketAddr, payload: &[u8]) -> Vec<u8> {
    let mut conn = TcpStream::connect(addr).await.expect("connect failed");
    conn.write_all(payload).await.expect("write failed");
    let mut out = Vec::new();
    conn.read_to_end(&mut out).await.expect("read failed");
    out
}

fn parse_response(raw: &[u8]) -> Response {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header/body separator");
    let head = String::from_utf8_lossy(&raw[..split]);
    let body = raw[split + 4..].to_vec();

    let mut lines = head.lines();
    let status_line = lines.next().unwrap_or("").to_string();
    let headers = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_lowercase(), value.trim().to_string()))
        })
        .collect();

    Response {
        status_line,
        headers,
        body,
    }
}
