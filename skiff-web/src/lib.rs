//! Skiff Web - HTTP surface for the LAN file-drop server
//!
//! Hand-rolled HTTP/1.1 over raw tokio sockets: one request line per
//! connection, a tagged route table, JSON listings and chunked octet-stream
//! downloads. The wire contract requires socket-level control (malformed
//! requests close with zero response bytes; every connection serves exactly
//! one response), which is why no web framework sits in between.

pub mod handlers;
pub mod http;
pub mod page;
pub mod server;
pub mod stream;

// Re-export main types
pub use http::Route;
pub use server::{Server, ServerError, ServerHandle};
