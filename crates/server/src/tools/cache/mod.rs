//! Cache-related MCP tools.

pub mod inspect;

pub use inspect::{CacheInspectParams, inspect_impl};
