//! Storage facade - top-level metric directory

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::column::Column;
use crate::page_store::PageStore;
use crate::{AggregationType, Record, Result, StrataError, TimeRange};

use super::{MetricId, MetricStorage, MetricStorageOptions};

/// The engine facade: a directory of metrics over one shared page store
pub struct Storage {
    page_store: Arc<dyn PageStore>,
    metrics: HashMap<MetricId, MetricStorage>,
    next_id: MetricId,
}

impl Storage {
    /// Create a storage engine over the given page store
    pub fn new(page_store: Arc<dyn PageStore>) -> Self {
        Self {
            page_store,
            metrics: HashMap::new(),
            next_id: 0,
        }
    }

    /// Validate `options` and register a new metric under the next id
    pub fn init_metric(&mut self, options: &MetricStorageOptions) -> Result<MetricId> {
        validate_options(options)?;
        let id = self.next_id;
        self.next_id += 1;
        self.metrics
            .insert(id, MetricStorage::new(options, Arc::clone(&self.page_store)));
        info!(metric_id = id, "initialized metric");
        Ok(id)
    }

    /// Append a series to a metric
    pub fn write(&mut self, id: MetricId, series: &[Record]) -> Result<()> {
        self.metrics
            .get_mut(&id)
            .ok_or(StrataError::MetricNotFound(id))?
            .write(series)
    }

    /// Answer `aggregation` over `range` for a metric
    pub fn read(
        &self,
        id: MetricId,
        range: TimeRange,
        aggregation: AggregationType,
    ) -> Result<Column> {
        self.metrics
            .get(&id)
            .ok_or(StrataError::MetricNotFound(id))?
            .read(range, aggregation)
    }

    /// Spill every metric's memtable into its level cascade
    pub fn flush(&mut self) -> Result<()> {
        for metric in self.metrics.values_mut() {
            metric.flush()?;
        }
        Ok(())
    }
}

fn validate_options(options: &MetricStorageOptions) -> Result<()> {
    let memtable = &options.memtable;
    if memtable.max_bytes_size.is_none() && memtable.max_age.is_none() {
        return Err(StrataError::Config(
            "memtable needs max_bytes_size or max_age".into(),
        ));
    }

    if let Some(first) = options.levels.first() {
        if first.bucket_interval != memtable.bucket_interval {
            return Err(StrataError::Config(
                "level 0 bucket interval must equal the memtable's".into(),
            ));
        }
        if first.store_raw && !memtable.store_raw {
            return Err(StrataError::Config(
                "raw storage on level 0 requires raw storage in the memtable".into(),
            ));
        }
    }

    for pair in options.levels.windows(2) {
        if pair[1].bucket_interval % pair[0].bucket_interval != 0 {
            return Err(StrataError::Config(
                "each level's bucket interval must be a multiple of its predecessor's".into(),
            ));
        }
        if pair[1].store_raw && !pair[0].store_raw {
            return Err(StrataError::Config(
                "raw storage is only allowed on a prefix of the level chain".into(),
            ));
        }
    }

    Ok(())
}
