//! Storage abstractions for service layer
//!
//! Reusable file-backed stores shared by the local backends.

pub mod json_map_store;
