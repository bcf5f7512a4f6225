//! Download endpoint behavior: byte-exact streaming, headers, misses.

use skiff_core::config::ServerConfig;
use skiff_web::Server;

use crate::support;

#[tokio::test]
async fn file_download_is_byte_exact_with_length() {
    let dir = tempfile::tempdir().unwrap();
    // Larger than one 64 KiB chunk so the copy loop iterates.
    let body: Vec<u8> = (0..150_000u32).map(|i| (i % 253) as u8).collect();
    tokio::fs::write(dir.path().join("blob.bin"), &body).await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();

    let response = support::get(handle.local_addr(), "/download/blob.bin").await;
    assert_eq!(response.status_code(), "200");
    assert_eq!(
        response.header("content-type"),
        Some("application/octet-stream")
    );
    assert_eq!(response.header("content-length"), Some("150000"));
    assert_eq!(response.header("connection"), Some("close"));
    assert_eq!(response.body, body);

    let disposition = response.header("content-disposition").unwrap();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("filename=\"blob.bin\""));

    handle.stop().await;
}

#[tokio::test]
async fn nested_and_encoded_paths_download() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    tokio::fs::create_dir(&docs).await.unwrap();
    tokio::fs::write(docs.join("über note.txt"), b"umlaut").await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();

    let response = support::get(
        handle.local_addr(),
        "/download/docs/%C3%BCber%20note.txt",
    )
    .await;
    assert_eq!(response.status_code(), "200");
    assert_eq!(response.body, b"umlaut");

    let disposition = response.header("content-disposition").unwrap();
    assert!(disposition.contains("filename*=UTF-8''%C3%BCber%20note.txt"));

    handle.stop().await;
}

#[tokio::test]
async fn directories_and_missing_paths_are_404_with_empty_body() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::create_dir(dir.path().join("docs")).await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    for target in ["/download/docs", "/download/absent.bin"] {
        let response = support::get(addr, target).await;
        assert_eq!(response.status_code(), "404", "target {target}");
        assert!(response.body.is_empty());
    }

    handle.stop().await;
}

#[tokio::test]
async fn strict_paths_turns_escapes_into_misses() {
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    tokio::fs::create_dir(&root).await.unwrap();
    tokio::fs::write(outer.path().join("secret.txt"), b"secret")
        .await
        .unwrap();
    tokio::fs::write(root.join("ok.txt"), b"ok").await.unwrap();

    let mut config = ServerConfig::full_storage(0, &root);
    config.strict_paths = true;
    let handle = Server::start(config).await.unwrap();
    let addr = handle.local_addr();

    let inside = support::get(addr, "/download/ok.txt").await;
    assert_eq!(inside.status_code(), "200");

    let escape = support::get(addr, "/download/../secret.txt").await;
    assert_eq!(escape.status_code(), "404");

    let listing_escape = support::get(addr, "/api/files/..").await;
    assert_eq!(listing_escape.body_text(), "[]");

    handle.stop().await;
}

#[tokio::test]
async fn lenient_default_joins_traversal_verbatim() {
    // Faithful-reproduction check for the documented traversal gap: with
    // strict_paths off, a `..` segment resolves outside the root.
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("root");
    tokio::fs::create_dir(&root).await.unwrap();
    tokio::fs::write(outer.path().join("outside.txt"), b"escaped")
        .await
        .unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, &root))
        .await
        .unwrap();

    let response = support::get(handle.local_addr(), "/download/../outside.txt").await;
    assert_eq!(response.status_code(), "200");
    assert_eq!(response.body, b"escaped");

    handle.stop().await;
}
