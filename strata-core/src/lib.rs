//! Strata Core - Embedded Tiered Time-Series Storage Engine
//!
//! A storage engine for numeric metrics. Each metric is an independent,
//! append-only stream of `(timestamp, value)` observations; the engine
//! maintains rolling pre-aggregations at configured resolutions, ages data
//! from memory to a tiered on-disk hierarchy, and answers range queries of
//! the form "aggregation A over window W".
//!
//! # Architecture
//!
//! - **Columns**: aggregated buckets (Sum/Count/Min/Max/Last, plus the
//!   synthesized Avg) and raw timestamp/value sequences, with a uniform
//!   write/read/merge/rescale contract
//! - **Memtable**: in-memory accumulator of one column per configured
//!   aggregation, flushed by size or age
//! - **Levels**: a cascade of persistent tiers of increasing bucket width,
//!   backed by a pluggable page store
//! - **Storage**: the facade mapping metric ids to their stores

pub mod column;
pub mod level;
pub mod memtable;
pub mod page_store;
pub mod storage;

mod error;
mod types;

pub use error::{Result, StrataError};
pub use types::*;

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    use crate::types::{duration, Duration};

    /// Default in-memory aggregation resolution (10s)
    pub const MEMTABLE_BUCKET_INTERVAL: Duration = duration::seconds(10);

    /// Default memtable size cap before flush (64MB)
    pub const MEMTABLE_SIZE_LIMIT: usize = 64 * 1024 * 1024;
}
