//! Column model
//!
//! A [`Column`] is a typed aggregation or raw sequence over a contiguous
//! time range. All variants share a uniform contract: write a sorted
//! series, read a sub-range, merge a same-kind column, extract contents,
//! serialize (stored kinds only).

mod aggregate;
mod codec;
mod raw;

pub use aggregate::AggregateColumn;
pub use codec::{column_from_bytes, column_to_bytes};
pub use raw::{RawReadColumn, RawTimestampsColumn, RawValuesColumn};

use crate::{ColumnKind, Duration, Record, Result, StrataError, TimeRange, Value};

/// A column of any kind
#[derive(Debug, Clone)]
pub enum Column {
    Aggregate(AggregateColumn),
    RawTimestamps(RawTimestampsColumn),
    RawValues(RawValuesColumn),
    RawRead(RawReadColumn),
}

impl Column {
    /// Create an empty column maintaining the given stored kind
    pub fn new_stored(kind: ColumnKind, bucket_interval: Duration) -> Self {
        match kind {
            ColumnKind::RawTimestamps => Column::RawTimestamps(RawTimestampsColumn::default()),
            ColumnKind::RawValues => Column::RawValues(RawValuesColumn::default()),
            ColumnKind::RawRead => Column::RawRead(RawReadColumn::default()),
            kind => Column::Aggregate(AggregateColumn::new(kind, bucket_interval)),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Aggregate(c) => c.kind(),
            Column::RawTimestamps(_) => ColumnKind::RawTimestamps,
            Column::RawValues(_) => ColumnKind::RawValues,
            Column::RawRead(_) => ColumnKind::RawRead,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Column::Aggregate(c) => c.is_empty(),
            Column::RawTimestamps(c) => c.is_empty(),
            Column::RawValues(c) => c.is_empty(),
            Column::RawRead(c) => c.is_empty(),
        }
    }

    /// Covered time range; raw values alone carry no time information
    pub fn time_range(&self) -> TimeRange {
        match self {
            Column::Aggregate(c) => c.time_range(),
            Column::RawTimestamps(c) => c.time_range(),
            Column::RawValues(_) => TimeRange::default(),
            Column::RawRead(c) => c.time_range(),
        }
    }

    /// Append a timestamp-sorted series
    pub fn write(&mut self, series: &[Record]) -> Result<()> {
        match self {
            Column::Aggregate(c) => c.write(series)?,
            Column::RawTimestamps(c) => c.write(series),
            Column::RawValues(c) => c.write(series),
            Column::RawRead(c) => c.write(series),
        }
        Ok(())
    }

    /// View of the data intersecting `range`; raw timestamps and raw
    /// values are only range-readable when paired
    pub fn read(&self, range: TimeRange) -> Option<Column> {
        match self {
            Column::Aggregate(c) => c.read(range).map(Column::Aggregate),
            Column::RawRead(c) => c.read(range).map(Column::RawRead),
            Column::RawTimestamps(_) | Column::RawValues(_) => None,
        }
    }

    /// Fold a same-kind column into this one
    pub fn merge(&mut self, other: Column) -> Result<()> {
        match (self, other) {
            (Column::Aggregate(a), Column::Aggregate(b)) => a.merge(b),
            (Column::RawTimestamps(a), Column::RawTimestamps(b)) => a.merge(b),
            (Column::RawValues(a), Column::RawValues(b)) => {
                a.merge(b);
                Ok(())
            }
            (Column::RawRead(a), Column::RawRead(b)) => a.merge(b),
            (this, other) => Err(StrataError::Logic(format!(
                "cannot merge {:?} column into {:?} column",
                other.kind(),
                this.kind()
            ))),
        }
    }

    /// Move the contents out, leaving an empty column of the same kind
    pub fn extract(&mut self) -> Column {
        match self {
            Column::Aggregate(c) => Column::Aggregate(c.extract()),
            Column::RawTimestamps(c) => Column::RawTimestamps(c.extract()),
            Column::RawValues(c) => Column::RawValues(c.extract()),
            Column::RawRead(c) => Column::RawRead(c.extract()),
        }
    }

    /// The column's payload as values; raw timestamps are widened to f64
    pub fn values(&self) -> Vec<Value> {
        match self {
            Column::Aggregate(c) => c.values().to_vec(),
            Column::RawTimestamps(c) => c.timestamps().iter().map(|&t| t as Value).collect(),
            Column::RawValues(c) => c.values().to_vec(),
            Column::RawRead(c) => c.values().to_vec(),
        }
    }
}

impl From<AggregateColumn> for Column {
    fn from(column: AggregateColumn) -> Self {
        Column::Aggregate(column)
    }
}

impl From<RawReadColumn> for Column {
    fn from(column: RawReadColumn) -> Self {
        Column::RawRead(column)
    }
}
