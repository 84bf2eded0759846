//! Memtable - in-memory head of a metric
//!
//! The memtable accumulates the newest data of one metric: one aggregate
//! column per configured aggregation, plus the raw timestamp/value pair
//! when raw storage is enabled. It always holds a suffix of the metric's
//! time range, so a read can miss at most one residual range at the front.

use serde::{Deserialize, Serialize};

use crate::column::{Column, RawReadColumn};
use crate::storage::MetricOptions;
use crate::{ColumnKind, Duration, Record, Result, TimeRange};

/// Memtable flush policy and resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemtableOptions {
    /// In-memory aggregate resolution
    pub bucket_interval: Duration,
    /// Soft size cap triggering a flush
    pub max_bytes_size: Option<usize>,
    /// Time-span cap triggering a flush
    pub max_age: Option<Duration>,
    /// Keep raw timestamps/values for raw queries
    pub store_raw: bool,
}

impl Default for MemtableOptions {
    fn default() -> Self {
        Self {
            bucket_interval: crate::config::MEMTABLE_BUCKET_INTERVAL,
            max_bytes_size: Some(crate::config::MEMTABLE_SIZE_LIMIT),
            max_age: None,
            store_raw: false,
        }
    }
}

/// Outcome of a memtable read
#[derive(Debug)]
pub struct ReadResult {
    /// Data covering the intersection of the request with the memtable
    pub found: Option<Column>,
    /// Residual sub-range the memtable does not hold; at most one, at the
    /// front of the request, because the memtable holds the data suffix
    pub not_found: Option<TimeRange>,
}

/// In-memory accumulator for one metric
pub struct Memtable {
    options: MemtableOptions,
    columns: Vec<Column>,
}

impl Memtable {
    /// Create a memtable with one column per configured aggregation
    pub fn new(options: MemtableOptions, metric_options: &MetricOptions) -> Self {
        let mut columns: Vec<Column> = metric_options
            .aggregation_types
            .iter()
            .map(|agg| Column::new_stored(agg.column_kind(), options.bucket_interval))
            .collect();
        if options.store_raw {
            columns.push(Column::new_stored(
                ColumnKind::RawTimestamps,
                options.bucket_interval,
            ));
            columns.push(Column::new_stored(
                ColumnKind::RawValues,
                options.bucket_interval,
            ));
        }
        Self { options, columns }
    }

    /// The memtable's aggregate resolution
    pub fn bucket_interval(&self) -> Duration {
        self.options.bucket_interval
    }

    /// Fan a timestamp-sorted series out to every held column
    pub fn write(&mut self, series: &[Record]) -> Result<()> {
        for column in &mut self.columns {
            column.write(series)?;
        }
        Ok(())
    }

    /// Read the column holding `kind` over `range`
    pub fn read(&self, range: TimeRange, kind: ColumnKind) -> ReadResult {
        if kind == ColumnKind::RawRead {
            return self.read_raw(range);
        }
        let Some(column) = self.columns.iter().find(|c| c.kind() == kind) else {
            return ReadResult {
                found: None,
                not_found: Some(range),
            };
        };
        Self::to_read_result(column.read(range), range)
    }

    fn read_raw(&self, range: TimeRange) -> ReadResult {
        let timestamps = self.columns.iter().find_map(|c| match c {
            Column::RawTimestamps(ts) => Some(ts),
            _ => None,
        });
        let values = self.columns.iter().find_map(|c| match c {
            Column::RawValues(vals) => Some(vals),
            _ => None,
        });
        let (Some(timestamps), Some(values)) = (timestamps, values) else {
            return ReadResult {
                found: None,
                not_found: Some(range),
            };
        };
        let found = RawReadColumn::read_pair(timestamps, values, range).map(Column::RawRead);
        Self::to_read_result(found, range)
    }

    fn to_read_result(found: Option<Column>, range: TimeRange) -> ReadResult {
        match found {
            None => ReadResult {
                found: None,
                not_found: Some(range),
            },
            Some(column) => {
                let covered = column.time_range();
                let not_found = (covered.start > range.start)
                    .then(|| TimeRange::new(range.start, covered.start));
                ReadResult {
                    found: Some(column),
                    not_found,
                }
            }
        }
    }

    /// True when either flush threshold is exceeded; false when none is
    /// configured
    pub fn need_flush(&self) -> bool {
        if let Some(cap) = self.options.max_bytes_size {
            if self.bytes_size() > cap {
                return true;
            }
        }
        if let Some(max_age) = self.options.max_age {
            let ts_column = self
                .columns
                .iter()
                .find(|c| c.kind() == ColumnKind::RawTimestamps)
                .or_else(|| {
                    self.columns
                        .iter()
                        .find(|c| c.kind() != ColumnKind::RawValues)
                });
            if let Some(column) = ts_column {
                if column.time_range().duration() >= max_age {
                    return true;
                }
            }
        }
        false
    }

    /// Move every column's contents out, leaving the memtable ready for
    /// the next generation of writes
    pub fn extract_columns(&mut self) -> Vec<Column> {
        self.columns.iter_mut().map(|c| c.extract()).collect()
    }

    fn bytes_size(&self) -> usize {
        self.columns
            .iter()
            .map(|column| match column {
                Column::Aggregate(c) => c.bucket_count() * 8,
                Column::RawTimestamps(c) => c.len() * 8,
                Column::RawValues(c) => c.len() * 8,
                Column::RawRead(c) => c.timestamps().len() * 16,
            })
            .sum()
    }
}
