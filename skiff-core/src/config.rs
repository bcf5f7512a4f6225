//! Centralized configuration for Skiff.
//!
//! All tunable parameters live here to avoid hard-coded values scattered
//! throughout the codebase. A `SkiffConfig` carries the CLI-facing defaults
//! and environment overrides; a `ServerConfig` is the immutable snapshot a
//! single server instance is constructed with.

use std::path::PathBuf;
use std::sync::Arc;

use crate::share::ContentSource;

/// Default listening port, matching the original device app.
pub const DEFAULT_PORT: u16 = 5000;

/// Immutable configuration owned by exactly one server instance.
///
/// Created fresh on every (re)start; reconfiguration means stopping the
/// running instance and constructing a new one, never mutating in place.
#[derive(Clone)]
pub struct ServerConfig {
    /// Port to bind; 0 requests an ephemeral port.
    pub port: u16,
    /// Ordered shared items. Non-empty means the server runs in shared mode.
    pub shared: Vec<Arc<dyn ContentSource>>,
    /// Full-storage root, also the fallback root while in shared mode.
    pub root_dir: PathBuf,
    /// Whether the full-storage root stays unreachable while in shared mode.
    pub private: bool,
    /// Reject sub-paths that escape `root_dir` after resolution.
    ///
    /// Off by default: the original implementation concatenates requested
    /// sub-paths without containment checks, and listings/downloads must
    /// behave identically unless the operator opts in.
    pub strict_paths: bool,
    /// Chunk size for streamed downloads.
    pub stream_buffer_size: usize,
}

impl ServerConfig {
    /// Configuration exposing a browsable directory tree.
    pub fn full_storage(port: u16, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            port,
            shared: Vec::new(),
            root_dir: root_dir.into(),
            private: true,
            strict_paths: false,
            stream_buffer_size: 65536,
        }
    }

    /// Configuration exposing a fixed set of shared items.
    pub fn shared_items(
        port: u16,
        shared: Vec<Arc<dyn ContentSource>>,
        root_dir: impl Into<PathBuf>,
        private: bool,
    ) -> Self {
        Self {
            port,
            shared,
            root_dir: root_dir.into(),
            private,
            strict_paths: false,
            stream_buffer_size: 65536,
        }
    }

    /// Shared mode is in effect whenever at least one item is configured.
    pub fn is_shared_mode(&self) -> bool {
        !self.shared.is_empty()
    }

    /// Display name reported by `/api/info`.
    pub fn root_folder_name(&self) -> String {
        if self.is_shared_mode() {
            "Shared Files".to_string()
        } else {
            self.root_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Storage".to_string())
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("shared_items", &self.shared.len())
            .field("root_dir", &self.root_dir)
            .field("private", &self.private)
            .field("strict_paths", &self.strict_paths)
            .field("stream_buffer_size", &self.stream_buffer_size)
            .finish()
    }
}

/// CLI-level configuration with defaults and environment overrides.
#[derive(Debug, Clone, Default)]
pub struct SkiffConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub sharing: SharingSettings,
}

/// Network listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Port to bind
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Filesystem serving settings.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Root directory for full-storage browsing
    pub root_dir: PathBuf,
    /// Containment check for requested sub-paths
    pub strict_paths: bool,
    /// Chunk size for streamed downloads
    pub stream_buffer_size: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            strict_paths: false,
            stream_buffer_size: 65536, // 64 KiB
        }
    }
}

/// Shared-mode settings.
#[derive(Debug, Clone)]
pub struct SharingSettings {
    /// Hide the full-storage root while sharing a fixed item set
    pub private: bool,
}

impl Default for SharingSettings {
    fn default() -> Self {
        Self { private: true }
    }
}

impl SkiffConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("SKIFF_PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.server.port = port;
        }

        if let Ok(root) = std::env::var("SKIFF_ROOT") {
            config.storage.root_dir = PathBuf::from(root);
        }

        if let Ok(strict) = std::env::var("SKIFF_STRICT_PATHS") {
            config.storage.strict_paths = strict.parse().unwrap_or(false);
        }

        if let Ok(private) = std::env::var("SKIFF_PRIVATE") {
            config.sharing.private = private.parse().unwrap_or(true);
        }

        config
    }

    /// Snapshot for a full-storage server instance.
    pub fn into_full_storage(self) -> ServerConfig {
        ServerConfig {
            port: self.server.port,
            shared: Vec::new(),
            root_dir: self.storage.root_dir,
            private: self.sharing.private,
            strict_paths: self.storage.strict_paths,
            stream_buffer_size: self.storage.stream_buffer_size,
        }
    }

    /// Snapshot for a shared-items server instance.
    pub fn into_shared(self, shared: Vec<Arc<dyn ContentSource>>) -> ServerConfig {
        ServerConfig {
            port: self.server.port,
            shared,
            root_dir: self.storage.root_dir,
            private: self.sharing.private,
            strict_paths: self.storage.strict_paths,
            stream_buffer_size: self.storage.stream_buffer_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::BytesSource;

    #[test]
    fn test_default_config_values() {
        let config = SkiffConfig::default();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.root_dir, PathBuf::from("."));
        assert!(!config.storage.strict_paths);
        assert_eq!(config.storage.stream_buffer_size, 65536);
        assert!(config.sharing.private);
    }

    #[test]
    fn test_mode_is_derived_from_shared_set() {
        let browse = ServerConfig::full_storage(0, "/srv/files");
        assert!(!browse.is_shared_mode());
        assert_eq!(browse.root_folder_name(), "files");

        let item: Arc<dyn ContentSource> = Arc::new(BytesSource::new("a.txt", b"hi".to_vec()));
        let shared = ServerConfig::shared_items(0, vec![item], "/srv/files", true);
        assert!(shared.is_shared_mode());
        assert_eq!(shared.root_folder_name(), "Shared Files");
    }

    #[test]
    fn test_root_folder_name_fallback() {
        let config = ServerConfig::full_storage(0, "/");
        assert_eq!(config.root_folder_name(), "Storage");
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("SKIFF_PORT", "8080");
            std::env::set_var("SKIFF_ROOT", "/tmp/skiff");
            std::env::set_var("SKIFF_STRICT_PATHS", "true");
            std::env::set_var("SKIFF_PRIVATE", "false");
        }

        let config = SkiffConfig::from_env();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.root_dir, PathBuf::from("/tmp/skiff"));
        assert!(config.storage.strict_paths);
        assert!(!config.sharing.private);

        // Cleanup
        unsafe {
            std::env::remove_var("SKIFF_PORT");
            std::env::remove_var("SKIFF_ROOT");
            std::env::remove_var("SKIFF_STRICT_PATHS");
            std::env::remove_var("SKIFF_PRIVATE");
        }
    }
}
