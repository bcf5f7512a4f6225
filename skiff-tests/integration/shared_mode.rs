//! Shared-mode scenarios: ordinal identifiers, handle downloads, and the
//! forced full-storage escape hatch.

use std::sync::Arc;

use skiff_core::config::ServerConfig;
use skiff_core::listing::FileEntry;
use skiff_core::share::{BytesSource, ContentSource};
use skiff_web::Server;

use crate::support;

fn two_items() -> Vec<Arc<dyn ContentSource>> {
    vec![
        Arc::new(BytesSource::new("photo.jpg", vec![0xAA; 1024])),
        Arc::new(BytesSource::new("song.mp3", vec![0x55; 2048])),
    ]
}

#[tokio::test]
async fn shared_listing_uses_ordinals_and_downloads_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::shared_items(0, two_items(), dir.path(), true);
    let handle = Server::start(config).await.unwrap();
    let addr = handle.local_addr();

    let info = support::get(addr, "/api/info").await.body_json();
    assert_eq!(info["root_folder_name"], "Shared Files");
    assert_eq!(info["is_shared_mode"], true);

    let entries: Vec<FileEntry> =
        serde_json::from_slice(&support::get(addr, "/api/files").await.body).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "photo.jpg");
    assert_eq!(entries[0].path, "shared_item_0");
    assert!(!entries[0].is_dir);
    assert_eq!(entries[0].size, 0);
    assert_eq!(entries[1].path, "shared_item_1");

    let download = support::get(addr, "/download/shared_item_1").await;
    assert_eq!(download.status_code(), "200");
    assert_eq!(download.body, vec![0x55; 2048]);
    let disposition = download.header("content-disposition").unwrap();
    assert!(disposition.contains("filename=\"song.mp3\""));
    // Handle sizes are unknown, so no Content-Length is promised.
    assert_eq!(download.header("content-length"), None);

    handle.stop().await;
}

#[tokio::test]
async fn invalid_shared_identifiers_are_404() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::shared_items(0, two_items(), dir.path(), true);
    let handle = Server::start(config).await.unwrap();
    let addr = handle.local_addr();

    for target in [
        "/download/shared_item_2",
        "/download/shared_item_99",
        "/download/shared_item_abc",
        "/download/shared_item_",
    ] {
        let response = support::get(addr, target).await;
        assert_eq!(response.status_code(), "404", "target {target}");
        assert!(response.body.is_empty());
    }

    handle.stop().await;
}

#[tokio::test]
async fn storage_escape_bypasses_shared_set_when_public() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("on-disk.txt"), b"disk")
        .await
        .unwrap();

    let config = ServerConfig::shared_items(0, two_items(), dir.path(), false);
    let handle = Server::start(config).await.unwrap();
    let addr = handle.local_addr();

    let info = support::get(addr, "/api/info").await.body_json();
    assert_eq!(info["is_private"], false);

    let entries: Vec<FileEntry> =
        serde_json::from_slice(&support::get(addr, "/api/files/__storage__").await.body).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "on-disk.txt");
    // Entry paths are relative to the forced root, not the escape prefix.
    assert_eq!(entries[0].path, "on-disk.txt");

    handle.stop().await;
}

#[tokio::test]
async fn storage_escape_refused_when_private() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("on-disk.txt"), b"disk")
        .await
        .unwrap();

    let config = ServerConfig::shared_items(0, two_items(), dir.path(), true);
    let handle = Server::start(config).await.unwrap();

    // With the escape denied, the empty remainder enumerates the shared
    // set as usual.
    let entries: Vec<FileEntry> = serde_json::from_slice(
        &support::get(handle.local_addr(), "/api/files/__storage__")
            .await
            .body,
    )
    .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, "shared_item_0");

    handle.stop().await;
}

#[tokio::test]
async fn empty_shared_set_falls_back_to_full_storage() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("fallback.txt"), b"f")
        .await
        .unwrap();

    let config = ServerConfig::shared_items(0, Vec::new(), dir.path(), true);
    let handle = Server::start(config).await.unwrap();

    let entries: Vec<FileEntry> =
        serde_json::from_slice(&support::get(handle.local_addr(), "/api/files").await.body)
            .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "fallback.txt");

    handle.stop().await;
}
