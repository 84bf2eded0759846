//! Raw timestamp and value columns
//!
//! Raw data is stored as two parallel sequences: a non-decreasing run of
//! timestamps and an equal-length run of values. They are persisted as
//! independent pages and paired into a [`RawReadColumn`] only to answer
//! raw range queries.

use crate::{Record, Result, StrataError, TimePoint, TimeRange, Value};

/// Non-decreasing sequence of observation timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTimestampsColumn {
    timestamps: Vec<TimePoint>,
}

impl RawTimestampsColumn {
    pub fn new(timestamps: Vec<TimePoint>) -> Self {
        debug_assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        Self { timestamps }
    }

    pub fn timestamps(&self) -> &[TimePoint] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// `[first, last + 1)`, or the empty range
    pub fn time_range(&self) -> TimeRange {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(&first), Some(&last)) => TimeRange::new(first, last + 1),
            _ => TimeRange::default(),
        }
    }

    pub fn write(&mut self, series: &[Record]) {
        debug_assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        self.timestamps.reserve(series.len());
        self.timestamps.extend(series.iter().map(|r| r.timestamp));
    }

    /// Append `other`, which must not start before this column ends
    pub fn merge(&mut self, other: RawTimestampsColumn) -> Result<()> {
        if self.timestamps.is_empty() {
            self.timestamps = other.timestamps;
            return Ok(());
        }
        let (Some(&first), Some(&last)) = (other.timestamps.first(), self.timestamps.last())
        else {
            return Ok(());
        };
        if first < last {
            return Err(StrataError::Logic(
                "merge order violated: incoming timestamps start earlier".into(),
            ));
        }
        self.timestamps.extend(other.timestamps);
        Ok(())
    }

    pub fn extract(&mut self) -> RawTimestampsColumn {
        RawTimestampsColumn {
            timestamps: std::mem::take(&mut self.timestamps),
        }
    }
}

/// Sequence of observation values, parallel to a timestamps column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawValuesColumn {
    values: Vec<Value>,
}

impl RawValuesColumn {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn write(&mut self, series: &[Record]) {
        self.values.reserve(series.len());
        self.values.extend(series.iter().map(|r| r.value));
    }

    pub fn merge(&mut self, other: RawValuesColumn) {
        self.values.extend(other.values);
    }

    pub fn extract(&mut self) -> RawValuesColumn {
        RawValuesColumn {
            values: std::mem::take(&mut self.values),
        }
    }
}

/// A paired timestamp/value view used to serve raw range queries.
/// Transient: never serialized to a page.
#[derive(Debug, Clone, Default)]
pub struct RawReadColumn {
    timestamps: RawTimestampsColumn,
    values: RawValuesColumn,
}

impl RawReadColumn {
    pub fn new(timestamps: RawTimestampsColumn, values: RawValuesColumn) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self { timestamps, values }
    }

    pub fn timestamps(&self) -> &[TimePoint] {
        self.timestamps.timestamps()
    }

    pub fn values(&self) -> &[Value] {
        self.values.values()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn time_range(&self) -> TimeRange {
        self.timestamps.time_range()
    }

    pub fn write(&mut self, series: &[Record]) {
        self.timestamps.write(series);
        self.values.write(series);
    }

    /// Records with timestamps inside `range`, or `None` if there are none
    pub fn read(&self, range: TimeRange) -> Option<RawReadColumn> {
        Self::read_pair(&self.timestamps, &self.values, range)
    }

    /// Range read over a borrowed timestamp/value pair; lets the memtable
    /// slice its raw columns without copying them first
    pub fn read_pair(
        timestamps: &RawTimestampsColumn,
        values: &RawValuesColumn,
        range: TimeRange,
    ) -> Option<RawReadColumn> {
        let ts = timestamps.timestamps();
        let lo = ts.partition_point(|&t| t < range.start);
        let hi = ts.partition_point(|&t| t < range.end);
        if lo >= hi {
            return None;
        }
        Some(RawReadColumn::new(
            RawTimestampsColumn::new(ts[lo..hi].to_vec()),
            RawValuesColumn::new(values.values()[lo..hi].to_vec()),
        ))
    }

    /// Append `other`'s records after this column's
    pub fn merge(&mut self, other: RawReadColumn) -> Result<()> {
        self.timestamps.merge(other.timestamps)?;
        self.values.merge(other.values);
        Ok(())
    }

    pub fn extract(&mut self) -> RawReadColumn {
        RawReadColumn {
            timestamps: self.timestamps.extract(),
            values: self.values.extract(),
        }
    }
}
