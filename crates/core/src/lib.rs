//! Core types and shared functionality for ghsnip.
//!
//! This crate provides:
//! - Source reference parsing and line-window extraction
//! - Cache store implementation with SQLite backend
//! - Clock abstraction for staleness decisions
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod range;
pub mod reference;

pub use cache::{CacheDb, CacheEntry, ContentStore};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use error::Error;
pub use range::slice;
pub use reference::{Hosts, SourceReference};
