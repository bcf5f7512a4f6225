//! Listing endpoint behavior over real sockets.

use skiff_core::config::ServerConfig;
use skiff_core::listing::FileEntry;
use skiff_web::Server;

use crate::support;

#[tokio::test]
async fn full_storage_root_lists_docs_and_file() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("a.txt"), b"0123456789")
        .await
        .unwrap();
    tokio::fs::create_dir(dir.path().join("docs")).await.unwrap();
    tokio::fs::write(dir.path().join("docs").join("inner.md"), b"# hi")
        .await
        .unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    let response = support::get(addr, "/api/files").await;
    assert_eq!(response.status_code(), "200");
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(
        response.header("cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );

    let entries: Vec<FileEntry> = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(entries.len(), 2);

    let file = entries.iter().find(|e| e.name == "a.txt").unwrap();
    assert!(!file.is_dir);
    assert_eq!(file.size, 10);

    let docs = entries.iter().find(|e| e.name == "docs").unwrap();
    assert!(docs.is_dir);

    // Navigating into the directory uses the entry's own path.
    let response = support::get(addr, &format!("/api/files/{}", docs.path)).await;
    let nested: Vec<FileEntry> = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].name, "inner.md");
    assert_eq!(nested[0].path, "docs/inner.md");

    handle.stop().await;
}

#[tokio::test]
async fn listing_round_trips_to_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("data.bin"), b"payload-bytes")
        .await
        .unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    let listing = support::get(addr, "/api/files").await.body_json();
    let path = listing[0]["path"].as_str().unwrap().to_string();

    let download = support::get(addr, &format!("/download/{path}")).await;
    assert_eq!(download.status_code(), "200");
    assert_eq!(download.body, b"payload-bytes");

    handle.stop().await;
}

#[tokio::test]
async fn empty_and_missing_directories_return_empty_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();
    let addr = handle.local_addr();

    let empty = support::get(addr, "/api/files").await;
    assert_eq!(empty.status_code(), "200");
    assert_eq!(empty.body_text(), "[]");

    let missing = support::get(addr, "/api/files/no/such/place").await;
    assert_eq!(missing.status_code(), "200");
    assert_eq!(missing.body_text(), "[]");

    handle.stop().await;
}

#[tokio::test]
async fn percent_encoded_sub_paths_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let spaced = dir.path().join("my docs");
    tokio::fs::create_dir(&spaced).await.unwrap();
    tokio::fs::write(spaced.join("note.txt"), b"n").await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, dir.path()))
        .await
        .unwrap();

    let response = support::get(handle.local_addr(), "/api/files/my%20docs").await;
    let entries: Vec<FileEntry> = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "my docs/note.txt");

    handle.stop().await;
}

#[tokio::test]
async fn info_reports_root_name_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("media");
    tokio::fs::create_dir(&root).await.unwrap();

    let handle = Server::start(ServerConfig::full_storage(0, &root))
        .await
        .unwrap();

    let info = support::get(handle.local_addr(), "/api/info").await.body_json();
    assert_eq!(info["root_folder_name"], "media");
    assert_eq!(info["is_shared_mode"], false);
    assert_eq!(info["is_private"], true);

    handle.stop().await;
}
