//! Connection listener and request dispatch.
//!
//! One accept loop per server instance, one spawned task per accepted
//! connection, no shared mutable state beyond the read-only config. A
//! stalled client holds its task indefinitely; there is deliberately no
//! read timeout or connection cap (see DESIGN.md).

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use skiff_core::config::ServerConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::http::{Route, parse_request_line, write_not_found};
use crate::{handlers, stream};

/// Errors surfaced by the listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Entry point for starting a server instance.
pub struct Server;

/// Handle to a running server instance.
///
/// Holds the only way to reach the accept loop; `stop` (or dropping the
/// handle, which drops the shutdown channel) closes the listener. At most
/// one instance can own a given port; reconfiguration is stop-then-start.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl Server {
    /// Binds the listening socket and spawns the accept loop.
    ///
    /// # Errors
    /// - `ServerError::Bind` - port already in use or otherwise unbindable;
    ///   fatal, never retried internally.
    pub async fn start(config: ServerConfig) -> Result<ServerHandle, ServerError> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
            .await
            .map_err(|source| ServerError::Bind {
                port: config.port,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let state = Arc::new(config);

        info!(%local_addr, config = ?state, "server listening");
        let accept_task = tokio::spawn(accept_loop(listener, state, shutdown_rx));

        Ok(ServerHandle {
            local_addr,
            shutdown,
            accept_task,
        })
    }
}

impl ServerHandle {
    /// Address the listener is bound to (resolves ephemeral ports).
    ///
    /// An unspecified bind address is reported as loopback so the result
    /// is always connectable from the local host.
    pub fn local_addr(&self) -> SocketAddr {
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        addr
    }

    /// Stops accepting connections and waits for the accept loop to exit.
    ///
    /// Already-accepted connections are unaffected and finish on their own.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.accept_task.await;
        info!(local_addr = %self.local_addr, "server stopped");
    }

    /// Whether the accept loop is still running.
    pub fn is_running(&self) -> bool {
        !self.accept_task.is_finished()
    }
}

async fn accept_loop(
    listener: TcpListener,
    state: Arc<ServerConfig>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        handle_connection(socket, peer, state).await;
                    });
                }
                Err(e) => {
                    warn!("accept failed: {e}");
                }
            },
        }
    }
    // Dropping the listener here closes the socket and frees the port;
    // in-flight connections hold their own sockets.
}

/// Serves exactly one request on the connection, then closes it.
///
/// Malformed request lines and non-GET methods terminate the connection
/// without writing any response bytes.
async fn handle_connection(socket: TcpStream, peer: SocketAddr, state: Arc<ServerConfig>) {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) | Err(_) => return,
        Ok(_) => {}
    }

    let Some(request) = parse_request_line(line.trim_end()) else {
        debug!(%peer, "malformed request line, closing");
        return;
    };
    if request.method != "GET" {
        debug!(%peer, method = %request.method, "unsupported method, closing");
        return;
    }

    let Ok(path) = urlencoding::decode(&request.target) else {
        debug!(%peer, "undecodable request target, closing");
        return;
    };

    // Drain the header block without interpreting it, so the socket closes
    // cleanly after the response instead of resetting on unread input.
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) if line.trim_end().is_empty() => break,
            Ok(_) => {}
        }
    }

    let route = Route::parse(&path);
    debug!(%peer, target = %request.target, ?route, "request");

    let result = match route {
        Route::Page => handlers::serve_page(&mut write_half).await,
        Route::Info => handlers::serve_info(&mut write_half, &state).await,
        Route::Listing { forced, sub_path } => {
            handlers::serve_listing(&mut write_half, &state, forced, &sub_path).await
        }
        Route::Download { identifier } => {
            stream::serve_download(&mut write_half, &state, &identifier).await
        }
        Route::NotFound => write_not_found(&mut write_half).await,
    };

    if let Err(e) = result {
        // Partial bytes may already be on the wire; nothing to retract.
        debug!(%peer, "connection aborted mid-response: {e}");
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;

    async fn send_raw(addr: SocketAddr, payload: &[u8]) -> Vec<u8> {
        let mut conn = TcpStream::connect(addr).await.unwrap();
        conn.write_all(payload).await.unwrap();
        let mut response = Vec::new();
        conn.read_to_end(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_malformed_request_closes_silently() {
        let dir = tempfile::tempdir().unwrap();
        let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
            .await
            .unwrap();

        let response = send_raw(handle.local_addr(), b"GARBAGE\r\n").await;
        assert!(response.is_empty());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_non_get_closes_silently() {
        let dir = tempfile::tempdir().unwrap();
        let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
            .await
            .unwrap();

        // Single line only: the connection closes before the header block,
        // so nothing further may be in flight.
        let response = send_raw(handle.local_addr(), b"POST /api/info HTTP/1.1\r\n").await;
        assert!(response.is_empty());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
            .await
            .unwrap();

        let response = send_raw(handle.local_addr(), b"GET /nope HTTP/1.1\r\n\r\n").await;
        let text = String::from_utf8(response).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));

        handle.stop().await;
    }
}
