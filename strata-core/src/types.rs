//! Core types for Strata

use serde::{Deserialize, Serialize};

/// Timestamp in microseconds since an arbitrary epoch
pub type TimePoint = u64;

/// Observation value
pub type Value = f64;

/// Span of time in microseconds
pub type Duration = u64;

/// Duration constructors
pub mod duration {
    use super::Duration;

    pub const fn millis(n: u64) -> Duration {
        n * 1_000
    }

    pub const fn seconds(n: u64) -> Duration {
        n * 1_000_000
    }

    pub const fn minutes(n: u64) -> Duration {
        n * 60 * 1_000_000
    }

    pub const fn hours(n: u64) -> Duration {
        n * 60 * 60 * 1_000_000
    }

    pub const fn days(n: u64) -> Duration {
        n * 24 * 60 * 60 * 1_000_000
    }

    pub const fn weeks(n: u64) -> Duration {
        n * 7 * 24 * 60 * 60 * 1_000_000
    }
}

/// Half-open time range `[start, end)`; the default value is the empty range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start timestamp (inclusive)
    pub start: TimePoint,
    /// End timestamp (exclusive)
    pub end: TimePoint,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        Self { start, end }
    }

    /// True iff the range covers no time
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Covered span
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Union of two ranges; the empty range is the neutral element
    pub fn merge(&self, other: &TimeRange) -> TimeRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        TimeRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A single observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Timestamp in microseconds
    pub timestamp: TimePoint,
    /// Observed value
    pub value: Value,
}

impl Record {
    /// Create a new record
    pub fn new(timestamp: TimePoint, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// Aggregations a read may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Min,
    Max,
    Last,
    /// Synthesized from Sum and Count, never stored
    Avg,
    /// The raw timestamp/value sequence
    Raw,
}

/// Aggregations a metric can be configured to maintain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoredAggregation {
    Sum,
    Count,
    Min,
    Max,
    Last,
}

/// Column taxonomy: the stored aggregates, the raw sequences, and the two
/// read-only kinds (Avg, RawRead) that only exist in query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Sum,
    Count,
    Min,
    Max,
    Last,
    Avg,
    RawTimestamps,
    RawValues,
    RawRead,
}

impl ColumnKind {
    /// True for the kinds holding time-aligned buckets
    pub fn is_bucketed(&self) -> bool {
        matches!(
            self,
            ColumnKind::Sum
                | ColumnKind::Count
                | ColumnKind::Min
                | ColumnKind::Max
                | ColumnKind::Last
                | ColumnKind::Avg
        )
    }

    /// True for the raw sequence kinds
    pub fn is_raw(&self) -> bool {
        matches!(self, ColumnKind::RawTimestamps | ColumnKind::RawValues)
    }
}

impl AggregationType {
    /// The column kind answering a read for this aggregation
    pub fn column_kind(self) -> ColumnKind {
        match self {
            AggregationType::Sum => ColumnKind::Sum,
            AggregationType::Count => ColumnKind::Count,
            AggregationType::Min => ColumnKind::Min,
            AggregationType::Max => ColumnKind::Max,
            AggregationType::Last => ColumnKind::Last,
            AggregationType::Avg => ColumnKind::Avg,
            AggregationType::Raw => ColumnKind::RawRead,
        }
    }
}

impl StoredAggregation {
    /// The column kind a metric maintains for this aggregation
    pub fn column_kind(self) -> ColumnKind {
        match self {
            StoredAggregation::Sum => ColumnKind::Sum,
            StoredAggregation::Count => ColumnKind::Count,
            StoredAggregation::Min => ColumnKind::Min,
            StoredAggregation::Max => ColumnKind::Max,
            StoredAggregation::Last => ColumnKind::Last,
        }
    }
}
