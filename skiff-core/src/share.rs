//! Content-handle registry for shared items.
//!
//! Shared items are opaque references to bytes handed over by the hosting
//! process (a picked file, a drag-and-drop payload). They expose only a
//! display name and a readable byte stream; size and modification time are
//! not reliably known, so nothing here pretends otherwise. On the wire an
//! item is identified purely by its ordinal position in the configured
//! list (`shared_item_<index>`), valid only for the current server
//! instance.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Wire identifier prefix for shared items.
pub const SHARED_ITEM_PREFIX: &str = "shared_item_";

/// Readable byte stream produced by opening a content source.
pub type ContentStream = Box<dyn AsyncRead + Send + Unpin>;

/// Errors raised by the content-handle registry.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("Shared item index {index} is out of range")]
    IndexOutOfRange { index: usize },

    #[error("Failed to open shared item: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability-style handle to externally supplied bytes.
///
/// Implementations expose exactly what the hosting process can guarantee:
/// a resolvable display name and a fresh byte stream per open. Callers
/// must treat size and mtime as unknown.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Name shown to clients and used for `Content-Disposition`.
    fn display_name(&self) -> String;

    /// Opens a fresh readable stream over the item's bytes.
    async fn open(&self) -> Result<ContentStream, ShareError>;
}

/// Formats the ordinal wire identifier for a shared item.
pub fn shared_item_id(index: usize) -> String {
    format!("{SHARED_ITEM_PREFIX}{index}")
}

/// Parses a wire identifier back into an ordinal index.
///
/// Returns `None` for anything that is not exactly the prefix followed by
/// a decimal index; such identifiers fall through to filesystem resolution.
pub fn parse_shared_item_id(identifier: &str) -> Option<usize> {
    identifier
        .strip_prefix(SHARED_ITEM_PREFIX)
        .and_then(|suffix| suffix.parse::<usize>().ok())
}

/// Resolves an ordinal index against the configured item list and opens it.
pub async fn open_shared_item(
    shared: &[Arc<dyn ContentSource>],
    index: usize,
) -> Result<(ContentStream, String), ShareError> {
    let source = shared
        .get(index)
        .ok_or(ShareError::IndexOutOfRange { index })?;
    let stream = source.open().await?;
    Ok((stream, source.display_name()))
}

/// Shared item backed by a regular file picked by the hosting process.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    display_name: String,
}

impl FileSource {
    /// Creates a source for `path`; the display name is its file name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Self { path, display_name }
    }
}

#[async_trait]
impl ContentSource for FileSource {
    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    async fn open(&self) -> Result<ContentStream, ShareError> {
        let file = tokio::fs::File::open(&self.path).await?;
        Ok(Box::new(file))
    }
}

/// Shared item backed by an in-memory byte buffer.
///
/// Used by embedders that receive payloads without a filesystem path, and
/// by tests.
#[derive(Debug, Clone)]
pub struct BytesSource {
    display_name: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            display_name: display_name.into(),
            bytes,
        }
    }
}

#[async_trait]
impl ContentSource for BytesSource {
    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    async fn open(&self) -> Result<ContentStream, ShareError> {
        Ok(Box::new(std::io::Cursor::new(self.bytes.clone())))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[test]
    fn test_identifier_round_trip() {
        assert_eq!(shared_item_id(0), "shared_item_0");
        assert_eq!(shared_item_id(17), "shared_item_17");
        assert_eq!(parse_shared_item_id("shared_item_0"), Some(0));
        assert_eq!(parse_shared_item_id("shared_item_17"), Some(17));
    }

    #[test]
    fn test_identifier_rejects_non_ordinals() {
        assert_eq!(parse_shared_item_id("shared_item_"), None);
        assert_eq!(parse_shared_item_id("shared_item_x"), None);
        assert_eq!(parse_shared_item_id("shared_item_-1"), None);
        assert_eq!(parse_shared_item_id("docs/report.pdf"), None);
        assert_eq!(parse_shared_item_id(""), None);
    }

    #[tokio::test]
    async fn test_bytes_source_streams_exact_bytes() {
        let source = BytesSource::new("greeting.txt", b"hello skiff".to_vec());
        assert_eq!(source.display_name(), "greeting.txt");

        let mut stream = source.open().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello skiff");
    }

    #[tokio::test]
    async fn test_file_source_display_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        tokio::fs::write(&path, b"# notes").await.unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.display_name(), "notes.md");

        let mut stream = source.open().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"# notes");
    }

    #[tokio::test]
    async fn test_open_shared_item_out_of_range() {
        let items: Vec<Arc<dyn ContentSource>> =
            vec![Arc::new(BytesSource::new("a", b"a".to_vec()))];

        assert!(open_shared_item(&items, 0).await.is_ok());
        let Err(err) = open_shared_item(&items, 1).await else {
            panic!("expected error for out-of-range index");
        };
        assert!(matches!(err, ShareError::IndexOutOfRange { index: 1 }));
    }
}
