//! Integration tests for Skiff
//!
//! These tests exercise the server over real sockets: raw HTTP requests
//! against ephemeral-port instances serving tempdir trees and in-memory
//! shared items, verifying the wire contract end to end.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/listing_api.rs"]
mod listing_api;

#[path = "integration/download_api.rs"]
mod download_api;

#[path = "integration/shared_mode.rs"]
mod shared_mode;

#[path = "integration/server_lifecycle.rs"]
mod server_lifecycle;
