//! Per-metric store
//!
//! Composes the memtable with the level cascade: writes land in the
//! memtable and spill into the levels when a flush threshold trips; reads
//! stitch the persisted prefix onto the in-memory suffix. Avg is never
//! stored and is synthesized from Sum and Count on every read.

use std::sync::Arc;

use tracing::debug;

use crate::column::{AggregateColumn, Column, RawReadColumn};
use crate::level::LevelManager;
use crate::memtable::Memtable;
use crate::page_store::PageStore;
use crate::{AggregationType, ColumnKind, Record, Result, TimeRange};

use super::MetricStorageOptions;

/// Storage for a single metric
pub struct MetricStorage {
    memtable: Memtable,
    levels: LevelManager,
}

impl MetricStorage {
    /// Create a metric store over a shared page store
    pub fn new(options: &MetricStorageOptions, store: Arc<dyn PageStore>) -> Self {
        Self {
            memtable: Memtable::new(options.memtable.clone(), &options.metric),
            levels: LevelManager::new(&options.levels, store),
        }
    }

    /// Append a timestamp-sorted series, flushing if a threshold trips
    pub fn write(&mut self, series: &[Record]) -> Result<()> {
        self.memtable.write(series)?;
        if self.memtable.need_flush() {
            debug!("memtable flush threshold tripped");
            self.flush()?;
        }
        Ok(())
    }

    /// Spill the memtable's columns into the level cascade
    pub fn flush(&mut self) -> Result<()> {
        let columns = self.memtable.extract_columns();
        self.levels.write(columns)
    }

    /// Answer `aggregation` over `range`; an empty column when no data
    /// intersects the request
    pub fn read(&self, range: TimeRange, aggregation: AggregationType) -> Result<Column> {
        Ok(self
            .read_inner(range, aggregation)?
            .unwrap_or_else(|| self.empty_column(aggregation)))
    }

    fn read_inner(&self, range: TimeRange, aggregation: AggregationType) -> Result<Option<Column>> {
        if aggregation == AggregationType::Avg {
            let sum = self.read_inner(range, AggregationType::Sum)?;
            let count = self.read_inner(range, AggregationType::Count)?;
            let (Some(Column::Aggregate(sum)), Some(Column::Aggregate(count))) = (sum, count)
            else {
                return Ok(None);
            };
            let avg = AggregateColumn::avg_of(&sum, &count)?;
            return Ok(Some(Column::Aggregate(avg)));
        }

        let kind = aggregation.column_kind();
        let result = self.memtable.read(range, kind);
        let persisted = match result.not_found {
            Some(missing) => self.levels.read(missing, kind)?,
            None => None,
        };
        match (persisted, result.found) {
            (Some(mut persisted), Some(found)) => {
                // the memtable holds the suffix, so the in-memory column
                // starts at or after the persisted one
                persisted.merge(found)?;
                Ok(Some(persisted))
            }
            (Some(persisted), None) => Ok(Some(persisted)),
            (None, found) => Ok(found),
        }
    }

    fn empty_column(&self, aggregation: AggregationType) -> Column {
        match aggregation.column_kind() {
            ColumnKind::RawRead => Column::RawRead(RawReadColumn::default()),
            kind => Column::Aggregate(AggregateColumn::new(kind, self.memtable.bucket_interval())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelOptions;
    use crate::memtable::MemtableOptions;
    use crate::page_store::MemPageStore;
    use crate::storage::MetricOptions;
    use crate::StoredAggregation;

    fn records(pairs: &[(u64, f64)]) -> Vec<Record> {
        pairs.iter().map(|&(t, v)| Record::new(t, v)).collect()
    }

    fn test_options(max_bytes: usize, store_raw: bool) -> MetricStorageOptions {
        MetricStorageOptions {
            metric: MetricOptions {
                aggregation_types: vec![
                    StoredAggregation::Sum,
                    StoredAggregation::Count,
                    StoredAggregation::Max,
                ],
            },
            memtable: MemtableOptions {
                bucket_interval: 1,
                max_bytes_size: Some(max_bytes),
                max_age: None,
                store_raw,
            },
            levels: vec![
                LevelOptions {
                    bucket_interval: 1,
                    level_duration: 1_000_000,
                    store_raw,
                },
                LevelOptions {
                    bucket_interval: 2,
                    level_duration: 1_000_000_000,
                    store_raw: false,
                },
            ],
        }
    }

    #[test]
    fn test_read_from_memtable_only() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, false), store);

        metric
            .write(&records(&[(1, 1.0), (2, 2.0), (3, 3.0)]))
            .unwrap();
        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Sum)
            .unwrap();
        assert_eq!(column.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(column.time_range(), TimeRange::new(1, 4));
    }

    #[test]
    fn test_read_stitches_levels_and_memtable() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, false), store);

        metric
            .write(&records(&[(1, 1.0), (2, 2.0), (3, 3.0)]))
            .unwrap();
        metric.flush().unwrap();

        // the persisted prefix and the fresh suffix come back as one column
        metric.write(&records(&[(4, 4.0), (5, 5.0)])).unwrap();
        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Sum)
            .unwrap();
        assert_eq!(column.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(column.time_range(), TimeRange::new(1, 6));
    }

    #[test]
    fn test_write_triggers_flush_by_size() {
        let store = Arc::new(MemPageStore::new());
        // three aggregates of one bucket each overflow a tiny cap
        let mut metric = MetricStorage::new(&test_options(8, false), store.clone());

        metric.write(&records(&[(1, 1.0)])).unwrap();
        assert!(store.page_count() > 0);

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Sum)
            .unwrap();
        assert_eq!(column.values(), vec![1.0]);
    }

    #[test]
    fn test_avg_synthesized_from_sum_and_count() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, false), store);

        metric
            .write(&records(&[(1, 1.0), (1, 2.0), (2, 9.0), (4, 5.0)]))
            .unwrap();
        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Avg)
            .unwrap();
        assert_eq!(column.kind(), ColumnKind::Avg);
        assert_eq!(column.values(), vec![1.5, 9.0, 0.0, 5.0]);
        assert_eq!(column.time_range(), TimeRange::new(1, 5));
    }

    #[test]
    fn test_avg_spanning_flush_boundary() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, false), store);

        metric.write(&records(&[(1, 1.0), (1, 3.0)])).unwrap();
        metric.flush().unwrap();
        metric.write(&records(&[(2, 10.0)])).unwrap();

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Avg)
            .unwrap();
        assert_eq!(column.values(), vec![2.0, 10.0]);
    }

    #[test]
    fn test_raw_read_spanning_flush_boundary() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, true), store);

        metric.write(&records(&[(1, 1.0), (2, 2.0)])).unwrap();
        metric.flush().unwrap();
        metric.write(&records(&[(3, 3.0), (3, 4.0)])).unwrap();

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Raw)
            .unwrap();
        let Column::RawRead(raw) = column else {
            panic!("expected a raw read column");
        };
        assert_eq!(raw.timestamps(), &[1, 2, 3, 3]);
        assert_eq!(raw.values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_read_returns_empty_column() {
        let store = Arc::new(MemPageStore::new());
        let metric = MetricStorage::new(&test_options(1 << 20, false), store);

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Sum)
            .unwrap();
        assert!(column.is_empty());
        assert_eq!(column.time_range(), TimeRange::default());

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Avg)
            .unwrap();
        assert!(column.is_empty());
        assert_eq!(column.kind(), ColumnKind::Avg);

        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Raw)
            .unwrap();
        assert!(column.is_empty());
    }

    #[test]
    fn test_unstored_aggregation_reads_empty() {
        let store = Arc::new(MemPageStore::new());
        let mut metric = MetricStorage::new(&test_options(1 << 20, false), store);
        metric.write(&records(&[(1, 1.0)])).unwrap();

        // Min was not configured for this metric
        let column = metric
            .read(TimeRange::new(0, 10), AggregationType::Min)
            .unwrap();
        assert!(column.is_empty());
    }
}
