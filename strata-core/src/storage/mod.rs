//! Storage - metric stores and the engine facade

mod engine;
mod metric;

pub use engine::Storage;
pub use metric::MetricStorage;

use serde::{Deserialize, Serialize};

use crate::level::LevelOptions;
use crate::memtable::MemtableOptions;
use crate::StoredAggregation;

/// Unique, dense, engine-assigned metric identifier
pub type MetricId = u64;

/// Which aggregations a metric maintains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricOptions {
    /// Stored aggregates kept by the memtable and every level
    pub aggregation_types: Vec<StoredAggregation>,
}

/// Full per-metric configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStorageOptions {
    pub metric: MetricOptions,
    pub memtable: MemtableOptions,
    /// Persistent tiers, finest first; may be empty for a memtable-only
    /// metric
    pub levels: Vec<LevelOptions>,
}
