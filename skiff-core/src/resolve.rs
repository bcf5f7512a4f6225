//! Dual-mode path resolution.
//!
//! A request carries a relative sub-path plus a flag asking for the forced
//! full-storage view. Resolution decides between the shared-item set, the
//! designated root directory, and misses. Requested sub-paths are joined
//! onto the root verbatim unless `strict_paths` is enabled, which turns
//! anything escaping the root into an ordinary miss.

use std::path::{Path, PathBuf};

use crate::config::ServerConfig;

/// Outcome of resolving a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingTarget {
    /// Enumerate the configured shared items.
    SharedSet,
    /// Enumerate the direct children of a filesystem directory.
    Directory(PathBuf),
    /// Nothing to enumerate; the listing is empty.
    Missing,
}

/// Resolves a listing request against the configured mode.
///
/// Decision table: with shared items present and no (permitted) forced
/// view, an empty sub-path enumerates the shared set and a non-empty one
/// falls back to the root directory; a permitted forced view or an empty
/// shared set always resolves under the root directory.
pub fn resolve_listing(config: &ServerConfig, forced: bool, sub_path: &str) -> ListingTarget {
    let forced = forced && !config.private;

    if config.is_shared_mode() && !forced {
        if sub_path.is_empty() {
            return ListingTarget::SharedSet;
        }
        // Shared mode normally has no subdirectories, but a handcrafted
        // request must still resolve without crashing.
        return directory_target(config, sub_path);
    }

    directory_target(config, sub_path)
}

/// Resolves a download identifier that is not a shared-item ordinal.
///
/// Returns the candidate filesystem path; existence and file-ness are the
/// streamer's concern. `None` means the path escaped the root under
/// `strict_paths`.
pub fn resolve_file(config: &ServerConfig, rel_path: &str) -> Option<PathBuf> {
    resolve_under_root(&config.root_dir, rel_path, config.strict_paths)
}

fn directory_target(config: &ServerConfig, sub_path: &str) -> ListingTarget {
    match resolve_under_root(&config.root_dir, sub_path, config.strict_paths) {
        Some(path) => ListingTarget::Directory(path),
        None => ListingTarget::Missing,
    }
}

/// Joins `rel_path` onto `root`, optionally enforcing containment.
///
/// The strict check canonicalizes both sides, so it also rejects escape via
/// symlinks; a path that fails to canonicalize (typically: does not exist)
/// is a miss as well, which matches the behavior misses get anyway.
pub fn resolve_under_root(root: &Path, rel_path: &str, strict: bool) -> Option<PathBuf> {
    let joined = if rel_path.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel_path)
    };

    if !strict {
        return Some(joined);
    }

    let canonical_root = root.canonicalize().ok()?;
    let canonical = joined.canonicalize().ok()?;
    canonical
        .starts_with(&canonical_root)
        .then_some(canonical)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ServerConfig;
    use crate::share::{BytesSource, ContentSource};

    fn shared_config(private: bool) -> ServerConfig {
        let items: Vec<Arc<dyn ContentSource>> = vec![
            Arc::new(BytesSource::new("a.txt", b"a".to_vec())),
            Arc::new(BytesSource::new("b.txt", b"b".to_vec())),
        ];
        ServerConfig::shared_items(0, items, "/srv/root", private)
    }

    #[test]
    fn test_shared_set_for_empty_sub_path() {
        let config = shared_config(true);
        assert_eq!(resolve_listing(&config, false, ""), ListingTarget::SharedSet);
    }

    #[test]
    fn test_shared_mode_sub_path_falls_back_to_root() {
        let config = shared_config(true);
        assert_eq!(
            resolve_listing(&config, false, "docs"),
            ListingTarget::Directory(PathBuf::from("/srv/root/docs"))
        );
    }

    #[test]
    fn test_forced_view_permitted_when_not_private() {
        let config = shared_config(false);
        assert_eq!(
            resolve_listing(&config, true, ""),
            ListingTarget::Directory(PathBuf::from("/srv/root"))
        );
    }

    #[test]
    fn test_forced_view_denied_when_private() {
        let config = shared_config(true);
        // The forced flag is ignored; the empty sub-path still enumerates
        // the shared set.
        assert_eq!(resolve_listing(&config, true, ""), ListingTarget::SharedSet);
    }

    #[test]
    fn test_full_storage_mode_always_resolves_under_root() {
        let config = ServerConfig::full_storage(0, "/srv/root");
        assert_eq!(
            resolve_listing(&config, false, ""),
            ListingTarget::Directory(PathBuf::from("/srv/root"))
        );
        assert_eq!(
            resolve_listing(&config, false, "a/b"),
            ListingTarget::Directory(PathBuf::from("/srv/root/a/b"))
        );
    }

    #[test]
    fn test_lenient_resolution_keeps_dot_dot() {
        // Faithful default: traversal segments are joined verbatim.
        let path = resolve_under_root(Path::new("/srv/root"), "../etc/passwd", false).unwrap();
        assert_eq!(path, PathBuf::from("/srv/root/../etc/passwd"));
    }

    #[test]
    fn test_strict_resolution_rejects_escape() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"s").unwrap();
        std::fs::write(root.join("ok.txt"), b"ok").unwrap();

        assert!(resolve_under_root(&root, "ok.txt", true).is_some());
        assert!(resolve_under_root(&root, "../secret.txt", true).is_none());
    }

    #[test]
    fn test_strict_resolution_misses_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_under_root(dir.path(), "missing.bin", true).is_none());
    }

    #[test]
    fn test_strict_listing_miss_is_missing_target() {
        let mut config = ServerConfig::full_storage(0, "/srv/does-not-exist");
        config.strict_paths = true;
        assert_eq!(resolve_listing(&config, false, "x"), ListingTarget::Missing);
    }
}
