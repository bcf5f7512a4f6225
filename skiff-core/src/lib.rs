//! Skiff Core - Sharing, path resolution and listing logic
//!
//! This crate provides the building blocks for the Skiff LAN file-drop
//! server: server configuration, the content-handle registry for shared
//! items, dual-mode path resolution, and JSON listing generation. It owns
//! no network code; the HTTP surface lives in `skiff-web`.

pub mod config;
pub mod listing;
pub mod resolve;
pub mod share;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ServerConfig, SkiffConfig};
pub use listing::FileEntry;
pub use resolve::ListingTarget;
pub use share::{BytesSource, ContentSource, FileSource, ShareError};
