//! Client code for ghsnip.
//!
//! This crate provides the HTTP fetcher, the fetch/cache/fallback resolver
//! and the snippet rendering shared by the server and CLI.

pub mod fetch;
pub mod language;
pub mod resolve;
pub mod snippet;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use language::language_for;
pub use resolve::{Origin, Resolved, Resolver, is_fresh};
pub use snippet::{Rendered, Snippet, render};
