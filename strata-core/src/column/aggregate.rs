//! Bucketed aggregate columns
//!
//! An aggregate column is a contiguous run of time-aligned buckets, each
//! holding the fold of every record whose timestamp falls inside it. The
//! five stored kinds (Sum, Count, Min, Max, Last) and the synthesized Avg
//! all share this shape; they differ only in identity element and reducer.

use crate::{ColumnKind, Duration, Record, Result, StrataError, TimePoint, TimeRange, Value};

/// The value an untouched bucket holds
fn identity(kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Min => f64::MAX,
        ColumnKind::Max => f64::MIN,
        _ => 0.0,
    }
}

/// Fold used by merge and rescale; for Last the right side wins
fn fold(kind: ColumnKind, acc: Value, v: Value) -> Value {
    match kind {
        ColumnKind::Sum | ColumnKind::Count => acc + v,
        ColumnKind::Min => acc.min(v),
        ColumnKind::Max => acc.max(v),
        _ => v,
    }
}

/// Fold used when writing a record into a bucket; Count ignores the value
fn accumulate(kind: ColumnKind, bucket: Value, value: Value) -> Value {
    match kind {
        ColumnKind::Sum => bucket + value,
        ColumnKind::Count => bucket + 1.0,
        ColumnKind::Min => bucket.min(value),
        ColumnKind::Max => bucket.max(value),
        _ => value,
    }
}

/// A column of time-aligned aggregate buckets
///
/// Invariants: `start_time` is a multiple of `bucket_interval`, and the
/// covered range is `[start_time, start_time + n * bucket_interval)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateColumn {
    kind: ColumnKind,
    buckets: Vec<Value>,
    start_time: TimePoint,
    bucket_interval: Duration,
}

impl AggregateColumn {
    /// Create an empty column of the given kind
    pub fn new(kind: ColumnKind, bucket_interval: Duration) -> Self {
        debug_assert!(kind.is_bucketed());
        debug_assert!(bucket_interval > 0);
        Self {
            kind,
            buckets: Vec::new(),
            start_time: 0,
            bucket_interval,
        }
    }

    /// Assemble a column from already-aggregated buckets
    pub fn from_parts(
        kind: ColumnKind,
        buckets: Vec<Value>,
        start_time: TimePoint,
        bucket_interval: Duration,
    ) -> Self {
        debug_assert!(kind.is_bucketed());
        debug_assert!(bucket_interval > 0);
        debug_assert_eq!(start_time % bucket_interval, 0);
        Self {
            kind,
            buckets,
            start_time,
            bucket_interval,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.buckets
    }

    pub fn start_time(&self) -> TimePoint {
        self.start_time
    }

    pub fn bucket_interval(&self) -> Duration {
        self.bucket_interval
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Covered time range; empty for a fresh column
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(
            self.start_time,
            self.start_time + self.buckets.len() as u64 * self.bucket_interval,
        )
    }

    /// Bucket index for a timestamp, clamped to `[0, n]`
    fn bucket_idx(&self, timestamp: TimePoint) -> usize {
        if timestamp < self.start_time {
            return 0;
        }
        if timestamp >= self.time_range().end {
            return self.buckets.len();
        }
        ((timestamp - self.start_time) / self.bucket_interval) as usize
    }

    /// Fold a timestamp-sorted series into the buckets, growing the column
    /// to the right as needed. Records older than `start_time` violate the
    /// append-only contract.
    pub fn write(&mut self, series: &[Record]) -> Result<()> {
        if self.kind == ColumnKind::Avg {
            return Err(StrataError::Logic(
                "average columns are derived and cannot be written".into(),
            ));
        }
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Ok(());
        };
        debug_assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        if self.buckets.is_empty() {
            self.start_time = first.timestamp - first.timestamp % self.bucket_interval;
        }
        debug_assert!(first.timestamp >= self.start_time);
        let needed = ((last.timestamp + 1 - self.start_time + self.bucket_interval - 1)
            / self.bucket_interval) as usize;
        if needed > self.buckets.len() {
            self.buckets.resize(needed, identity(self.kind));
        }
        for record in series {
            let idx = self.bucket_idx(record.timestamp);
            self.buckets[idx] = accumulate(self.kind, self.buckets[idx], record.value);
        }
        Ok(())
    }

    /// View of the buckets intersecting `range`, or `None` if the
    /// intersection is empty. A partially covered trailing bucket is
    /// included; the result's start is aligned to the bucket interval.
    pub fn read(&self, range: TimeRange) -> Option<AggregateColumn> {
        if self.buckets.is_empty() {
            return None;
        }
        let start_bucket = self.bucket_idx(range.start);
        let mut end_bucket = self.bucket_idx(range.end);
        if end_bucket < self.buckets.len() && range.end % self.bucket_interval != 0 {
            end_bucket += 1;
        }
        if start_bucket == end_bucket {
            return None;
        }
        let start_time = if range.start > self.start_time {
            range.start - (range.start - self.start_time) % self.bucket_interval
        } else {
            self.start_time
        };
        Some(AggregateColumn::from_parts(
            self.kind,
            self.buckets[start_bucket..end_bucket].to_vec(),
            start_time,
            self.bucket_interval,
        ))
    }

    /// Fold `other` into this column. `other` must be of the same kind and
    /// must not start before this column; when intervals differ the finer
    /// side is rescaled to the coarser first.
    pub fn merge(&mut self, mut other: AggregateColumn) -> Result<()> {
        if self.kind == ColumnKind::Avg {
            return Err(StrataError::Logic(
                "average columns are derived and cannot be merged".into(),
            ));
        }
        if other.kind != self.kind {
            return Err(StrataError::Logic(format!(
                "cannot merge {:?} column into {:?} column",
                other.kind, self.kind
            )));
        }
        if other.bucket_interval != self.bucket_interval {
            if other.bucket_interval < self.bucket_interval {
                other.rescale(self.bucket_interval)?;
            } else {
                self.rescale(other.bucket_interval)?;
            }
        }
        if self.buckets.is_empty() {
            self.buckets = other.buckets;
            self.start_time = other.start_time;
            return Ok(());
        }
        if other.buckets.is_empty() {
            return Ok(());
        }
        if other.start_time < self.start_time {
            return Err(StrataError::Logic(
                "merge order violated: incoming column starts earlier".into(),
            ));
        }

        let other_range = other.time_range();
        let overlap_start = self.bucket_idx(other_range.start);
        let overlap_end = self.bucket_idx(other_range.end);
        for i in overlap_start..overlap_end {
            self.buckets[i] = fold(self.kind, self.buckets[i], other.buckets[i - overlap_start]);
        }

        let end = self.time_range().end;
        if other.start_time > end {
            let gap = ((other.start_time - end) / self.bucket_interval) as usize;
            let fill = identity(self.kind);
            self.buckets.extend(std::iter::repeat(fill).take(gap));
        }

        let overlap = overlap_end - overlap_start;
        self.buckets.extend_from_slice(&other.buckets[overlap..]);
        Ok(())
    }

    /// Coarsen the buckets to a multiple of the current interval.
    /// Consecutive buckets mapping to the same new bucket (by absolute
    /// start time) are folded together; afterwards `start_time` is aligned
    /// down to the new interval.
    pub fn rescale(&mut self, new_interval: Duration) -> Result<()> {
        if self.kind == ColumnKind::Avg {
            return Err(StrataError::Logic(
                "average columns are derived and cannot be rescaled".into(),
            ));
        }
        if new_interval == self.bucket_interval {
            return Ok(());
        }
        if new_interval % self.bucket_interval != 0 {
            return Err(StrataError::Logic(format!(
                "cannot rescale interval {} to non-multiple {}",
                self.bucket_interval, new_interval
            )));
        }
        let scale = (new_interval / self.bucket_interval) as usize;
        let mut new_len = self.buckets.len() / scale;
        if self.start_time % new_interval != 0 || self.buckets.len() % scale != 0 {
            new_len += 1;
        }

        let mut acc = identity(self.kind);
        let mut pending = false;
        let mut pos = 0;
        for i in 0..self.buckets.len() {
            acc = fold(self.kind, acc, self.buckets[i]);
            pending = true;
            let this_group = (self.start_time + self.bucket_interval * i as u64) / new_interval;
            let next_group =
                (self.start_time + self.bucket_interval * (i as u64 + 1)) / new_interval;
            if this_group != next_group {
                self.buckets[pos] = acc;
                pos += 1;
                acc = identity(self.kind);
                pending = false;
            }
        }
        if pending {
            self.buckets[pos] = acc;
            pos += 1;
        }
        debug_assert_eq!(pos, new_len);

        self.start_time -= self.start_time % new_interval;
        self.bucket_interval = new_interval;
        self.buckets.truncate(new_len);
        Ok(())
    }

    /// Move the contents out, leaving this column empty
    pub fn extract(&mut self) -> AggregateColumn {
        let buckets = std::mem::take(&mut self.buckets);
        let start_time = std::mem::replace(&mut self.start_time, 0);
        AggregateColumn {
            kind: self.kind,
            buckets,
            start_time,
            bucket_interval: self.bucket_interval,
        }
    }

    /// Synthesize an Avg column from a same-shape Sum and Count pair.
    /// Buckets with a zero count yield zero.
    pub fn avg_of(sum: &AggregateColumn, count: &AggregateColumn) -> Result<AggregateColumn> {
        if sum.kind != ColumnKind::Sum || count.kind != ColumnKind::Count {
            return Err(StrataError::Logic(
                "average requires a sum and a count column".into(),
            ));
        }
        if sum.bucket_interval != count.bucket_interval {
            return Err(StrataError::Logic(
                "cannot average columns with different bucket intervals".into(),
            ));
        }
        if sum.start_time != count.start_time {
            return Err(StrataError::Logic(
                "cannot average columns with different start times".into(),
            ));
        }
        if sum.buckets.len() != count.buckets.len() {
            return Err(StrataError::Logic(
                "cannot average columns with different bucket counts".into(),
            ));
        }
        let buckets = sum
            .buckets
            .iter()
            .zip(&count.buckets)
            .map(|(&s, &c)| if c == 0.0 { 0.0 } else { s / c })
            .collect();
        Ok(AggregateColumn::from_parts(
            ColumnKind::Avg,
            buckets,
            sum.start_time,
            sum.bucket_interval,
        ))
    }
}
