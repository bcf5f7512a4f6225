//! Content streaming for downloads.
//!
//! Resolves a download identifier to either a shared-item ordinal or a
//! root-relative file, then copies the bytes to the socket in fixed-size
//! chunks. Backpressure from the client naturally throttles the copy; a
//! mid-transfer I/O failure aborts the connection with no recovery.

use std::path::Path;

use skiff_core::config::ServerConfig;
use skiff_core::resolve::resolve_file;
use skiff_core::share::{
    ContentStream, SHARED_ITEM_PREFIX, open_shared_item, parse_shared_item_id,
};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::http::{write_download_headers, write_not_found};

/// A resolved download target ready to stream.
pub struct DownloadSource {
    /// Byte stream to copy to the client.
    pub stream: ContentStream,
    /// Name carried in `Content-Disposition`.
    pub display_name: String,
    /// Known byte length; `None` for shared items.
    pub length: Option<u64>,
}

/// Serves one download request: headers plus chunked body on a hit, an
/// empty 404 on a miss.
pub async fn serve_download<W: AsyncWrite + Unpin>(
    writer: &mut W,
    config: &ServerConfig,
    identifier: &str,
) -> std::io::Result<()> {
    let Some(source) = open_target(config, identifier).await else {
        return write_not_found(writer).await;
    };

    let disposition = content_disposition(&source.display_name);
    write_download_headers(writer, &disposition, source.length).await?;
    copy_chunks(source.stream, writer, config.stream_buffer_size).await?;
    writer.flush().await
}

/// Resolves an identifier to a byte source.
///
/// Identifiers in the shared-item naming scheme never fall through to the
/// filesystem: an unparsable or out-of-range ordinal is a miss. Everything
/// else resolves as a path under the full-storage root; directories and
/// absent paths are misses.
pub async fn open_target(config: &ServerConfig, identifier: &str) -> Option<DownloadSource> {
    if identifier.starts_with(SHARED_ITEM_PREFIX) {
        let index = parse_shared_item_id(identifier)?;
        return match open_shared_item(&config.shared, index).await {
            Ok((stream, display_name)) => Some(DownloadSource {
                stream,
                display_name,
                length: None,
            }),
            Err(e) => {
                debug!(identifier, "shared item miss: {e}");
                None
            }
        };
    }

    let path = resolve_file(config, identifier)?;
    let metadata = tokio::fs::metadata(&path).await.ok()?;
    if metadata.is_dir() {
        return None;
    }

    let file = tokio::fs::File::open(&path).await.ok()?;
    Some(DownloadSource {
        stream: Box::new(file),
        display_name: file_display_name(&path),
        length: Some(metadata.len()),
    })
}

/// Copies the full stream in `chunk_size` reads until EOF.
async fn copy_chunks<W: AsyncWrite + Unpin>(
    mut stream: ContentStream,
    writer: &mut W,
    chunk_size: usize,
) -> std::io::Result<()> {
    let mut buffer = vec![0u8; chunk_size];
    loop {
        let n = stream.read(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }
        writer.write_all(&buffer[..n]).await?;
    }
}

/// Builds the `Content-Disposition` value: a plain ASCII `filename` plus a
/// percent-encoded UTF-8 `filename*`, so both old and new client decoders
/// recover a usable name.
pub fn content_disposition(display_name: &str) -> String {
    let ascii: String = display_name
        .chars()
        .map(|c| {
            if c.is_ascii() && c != '"' && c != '\\' && !c.is_ascii_control() {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = urlencoding::encode(display_name);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use skiff_core::share::{BytesSource, ContentSource};

    use super::*;

    fn config_with_items(items: Vec<Arc<dyn ContentSource>>, root: &Path) -> ServerConfig {
        ServerConfig::shared_items(0, items, root, true)
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_and_quotes() {
        let value = content_disposition("résumé \"v2\".pdf");
        assert!(value.starts_with("attachment; filename=\"r_sum_ _v2_.pdf\""));
        assert!(value.contains("filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.pdf"));
    }

    #[tokio::test]
    async fn test_shared_identifier_resolves_by_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<Arc<dyn ContentSource>> = vec![
            Arc::new(BytesSource::new("a.bin", vec![1, 2, 3])),
            Arc::new(BytesSource::new("b.bin", vec![4, 5])),
        ];
        let config = config_with_items(items, dir.path());

        let source = open_target(&config, "shared_item_1").await.unwrap();
        assert_eq!(source.display_name, "b.bin");
        assert_eq!(source.length, None);

        let mut bytes = Vec::new();
        let mut stream = source.stream;
        stream.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_malformed_or_out_of_range_ordinals_miss() {
        let dir = tempfile::tempdir().unwrap();
        let items: Vec<Arc<dyn ContentSource>> =
            vec![Arc::new(BytesSource::new("a.bin", vec![1]))];
        let config = config_with_items(items, dir.path());

        assert!(open_target(&config, "shared_item_1").await.is_none());
        assert!(open_target(&config, "shared_item_zzz").await.is_none());
        assert!(open_target(&config, "shared_item_").await.is_none());
    }

    #[tokio::test]
    async fn test_filesystem_path_resolves_with_length() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"0123456789")
            .await
            .unwrap();
        let config = ServerConfig::full_storage(0, dir.path());

        let source = open_target(&config, "a.txt").await.unwrap();
        assert_eq!(source.display_name, "a.txt");
        assert_eq!(source.length, Some(10));
    }

    #[tokio::test]
    async fn test_directories_and_absent_paths_miss() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("docs")).await.unwrap();
        let config = ServerConfig::full_storage(0, dir.path());

        assert!(open_target(&config, "docs").await.is_none());
        assert!(open_target(&config, "absent.txt").await.is_none());
        assert!(open_target(&config, "").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_download_miss_writes_404() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::full_storage(0, dir.path());

        let mut out = Vec::new();
        serve_download(&mut out, &config, "nope.bin").await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_serve_download_streams_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let body: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(dir.path().join("big.bin"), &body).await.unwrap();
        let config = ServerConfig::full_storage(0, dir.path());

        let mut out = Vec::new();
        serve_download(&mut out, &config, "big.bin").await.unwrap();

        let split = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        let head = String::from_utf8_lossy(&out[..split]);
        assert!(head.contains("Content-Length: 200000"));
        assert!(head.contains("Content-Type: application/octet-stream"));
        assert_eq!(&out[split + 4..], &body[..]);
    }
}
