//! Bind, stop and restart semantics.

use skiff_core::config::ServerConfig;
use skiff_web::{Server, ServerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::support;

#[tokio::test]
async fn second_bind_on_same_port_fails() {
    let dir = tempfile::tempdir().unwrap();
    let first = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let port = first.local_addr().port();

    let err = Server::start(ServerConfig::full_storage(port, dir.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::Bind { port: p, .. } if p == port));

    first.stop().await;
}

#[tokio::test]
async fn stop_then_restart_rebinds_the_port() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("x.txt"), b"x").await.unwrap();

    let first = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let port = first.local_addr().port();
    assert!(first.is_running());
    first.stop().await;

    let second = Server::start(ServerConfig::full_storage(port, dir.path()))
        .await
        .unwrap();
    let response = support::get(second.local_addr(), "/api/files").await;
    assert_eq!(response.status_code(), "200");

    second.stop().await;
}

#[tokio::test]
async fn stopped_server_refuses_new_connections() {
    let dir = tempfile::tempdir().unwrap();
    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();
    handle.stop().await;

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn in_flight_download_survives_stop() {
    let dir = tempfile::tempdir().unwrap();
    let body: Vec<u8> = (0..500_000u32).map(|i| (i % 241) as u8).collect();
    tokio::fs::write(dir.path().join("big.bin"), &body).await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(b"GET /download/big.bin HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    // Wait until the handler has started writing, then close the listener.
    let mut first = [0u8; 1];
    conn.read_exact(&mut first).await.unwrap();
    handle.stop().await;

    let mut rest = Vec::new();
    conn.read_to_end(&mut rest).await.unwrap();
    let mut full = vec![first[0]];
    full.extend(rest);

    let split = full.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    assert_eq!(&full[split + 4..], &body[..]);
}

#[tokio::test]
async fn page_served_on_root_and_files() {
    let dir = tempfile::tempdir().unwrap();
    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    for target in ["/", "/files"] {
        let response = support::get(addr, target).await;
        assert_eq!(response.status_code(), "200", "target {target}");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert!(response.body_text().contains("<!DOCTYPE html>"));
    }

    handle.stop().await;
}
