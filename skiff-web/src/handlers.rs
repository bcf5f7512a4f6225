//! Request handlers for the page, info and listing endpoints.
//!
//! Downloads live in [`crate::stream`]; everything here writes a complete
//! in-memory response.

use serde::{Deserialize, Serialize};
use skiff_core::config::ServerConfig;
use skiff_core::listing::{FileEntry, list_directory, list_shared};
use skiff_core::resolve::{ListingTarget, resolve_listing};
use tokio::io::AsyncWrite;

use crate::http::write_response;
use crate::page::BROWSER_PAGE;

/// Server metadata returned by `/api/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub root_folder_name: String,
    pub is_shared_mode: bool,
    pub is_private: bool,
}

impl ServerInfo {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            root_folder_name: config.root_folder_name(),
            is_shared_mode: config.is_shared_mode(),
            is_private: config.private,
        }
    }
}

/// Serves the embedded browser page.
pub async fn serve_page<W: AsyncWrite + Unpin>(writer: &mut W) -> std::io::Result<()> {
    write_response(writer, "200 OK", "text/html", BROWSER_PAGE.as_bytes()).await
}

/// Serves `/api/info`.
pub async fn serve_info<W: AsyncWrite + Unpin>(
    writer: &mut W,
    config: &ServerConfig,
) -> std::io::Result<()> {
    let body = to_json_bytes(&ServerInfo::from_config(config));
    write_response(writer, "200 OK", "application/json", &body).await
}

/// Serves `/api/files[/<sub-path>]` as a JSON array of [`FileEntry`].
///
/// Resolution misses produce an empty array, never an error status.
pub async fn serve_listing<W: AsyncWrite + Unpin>(
    writer: &mut W,
    config: &ServerConfig,
    forced: bool,
    sub_path: &str,
) -> std::io::Result<()> {
    let entries = build_listing(config, forced, sub_path).await;
    let body = to_json_bytes(&entries);
    write_response(writer, "200 OK", "application/json", &body).await
}

/// Resolves and enumerates one listing request.
pub async fn build_listing(config: &ServerConfig, forced: bool, sub_path: &str) -> Vec<FileEntry> {
    match resolve_listing(config, forced, sub_path) {
        ListingTarget::SharedSet => list_shared(&config.shared),
        ListingTarget::Directory(dir) => list_directory(&dir, sub_path).await,
        ListingTarget::Missing => Vec::new(),
    }
}

fn to_json_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // Wire types serialize infallibly; an empty array is the degenerate
    // fallback rather than a 500 the surface has no vocabulary for.
    serde_json::to_vec(value).unwrap_or_else(|_| b"[]".to_vec())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use skiff_core::share::{BytesSource, ContentSource};

    use super::*;

    #[tokio::test]
    async fn test_info_reports_mode_and_privacy() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<Arc<dyn ContentSource>> =
            vec![Arc::new(BytesSource::new("x.txt", b"x".to_vec()))];
        let config = ServerConfig::shared_items(0, items, dir.path(), false);

        let mut out = Vec::new();
        serve_info(&mut out, &config).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let body = text.split("\r\n\r\n").nth(1).unwrap();
        let info: ServerInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.root_folder_name, "Shared Files");
        assert!(info.is_shared_mode);
        assert!(!info.is_private);
    }

    #[tokio::test]
    async fn test_listing_shared_set_then_forced_storage() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("root.txt"), b"r").await.unwrap();
        let items: Vec<Arc<dyn ContentSource>> =
            vec![Arc::new(BytesSource::new("x.txt", b"x".to_vec()))];
        let config = ServerConfig::shared_items(0, items, dir.path(), false);

        let shared = build_listing(&config, false, "").await;
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].path, "shared_item_0");

        let storage = build_listing(&config, true, "").await;
        assert_eq!(storage.len(), 1);
        assert_eq!(storage[0].name, "root.txt");
    }

    #[tokio::test]
    async fn test_forced_listing_denied_while_private() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("root.txt"), b"r").await.unwrap();
        let items: Vec<Arc<dyn ContentSource>> =
            vec![Arc::new(BytesSource::new("x.txt", b"x".to_vec()))];
        let config = ServerConfig::shared_items(0, items, dir.path(), true);

        // The forced flag is not granted; the shared set remains the root.
        let entries = build_listing(&config, true, "").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "shared_item_0");
    }

    #[tokio::test]
    async fn test_listing_missing_directory_is_empty_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::full_storage(0, dir.path());

        let mut out = Vec::new();
        serve_listing(&mut out, &config, false, "no/such/dir")
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\n[]"));
    }

    #[tokio::test]
    async fn test_page_is_html() {
        let mut out = Vec::new();
        serve_page(&mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("<!DOCTYPE html>"));
    }
}
