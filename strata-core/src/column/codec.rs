//! Page codec for columns
//!
//! Wire format, all little-endian:
//! - aggregate page: `u64 bucket_interval || u64 start_time || f64 buckets[n]`,
//!   with `n` inferred from the payload length
//! - raw timestamps page: packed `u64` array
//! - raw values page: packed `f64` array
//!
//! The transient kinds (Avg is derived, RawRead is a query view) never
//! reach a page.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{AggregateColumn, Column, RawTimestampsColumn, RawValuesColumn};
use crate::{ColumnKind, Result, StrataError};

/// Serialize a column into page bytes
pub fn column_to_bytes(column: &Column) -> Result<Bytes> {
    match column {
        Column::Aggregate(c) => {
            let mut buf = BytesMut::with_capacity(16 + c.values().len() * 8);
            buf.put_u64_le(c.bucket_interval());
            buf.put_u64_le(c.start_time());
            for &v in c.values() {
                buf.put_f64_le(v);
            }
            Ok(buf.freeze())
        }
        Column::RawTimestamps(c) => {
            let mut buf = BytesMut::with_capacity(c.len() * 8);
            for &t in c.timestamps() {
                buf.put_u64_le(t);
            }
            Ok(buf.freeze())
        }
        Column::RawValues(c) => {
            let mut buf = BytesMut::with_capacity(c.len() * 8);
            for &v in c.values() {
                buf.put_f64_le(v);
            }
            Ok(buf.freeze())
        }
        Column::RawRead(_) => Err(StrataError::Logic(
            "raw read views are transient and cannot be serialized".into(),
        )),
    }
}

/// Deserialize page bytes into a column of the given stored kind
pub fn column_from_bytes(mut bytes: &[u8], kind: ColumnKind) -> Result<Column> {
    match kind {
        ColumnKind::RawTimestamps => {
            if bytes.len() % 8 != 0 {
                return Err(StrataError::InvalidFormat(format!(
                    "raw timestamps page has trailing {} bytes",
                    bytes.len() % 8
                )));
            }
            let mut timestamps = Vec::with_capacity(bytes.len() / 8);
            while bytes.has_remaining() {
                timestamps.push(bytes.get_u64_le());
            }
            Ok(Column::RawTimestamps(RawTimestampsColumn::new(timestamps)))
        }
        ColumnKind::RawValues => {
            if bytes.len() % 8 != 0 {
                return Err(StrataError::InvalidFormat(format!(
                    "raw values page has trailing {} bytes",
                    bytes.len() % 8
                )));
            }
            let mut values = Vec::with_capacity(bytes.len() / 8);
            while bytes.has_remaining() {
                values.push(bytes.get_f64_le());
            }
            Ok(Column::RawValues(RawValuesColumn::new(values)))
        }
        ColumnKind::Sum
        | ColumnKind::Count
        | ColumnKind::Min
        | ColumnKind::Max
        | ColumnKind::Last => {
            if bytes.len() < 16 || (bytes.len() - 16) % 8 != 0 {
                return Err(StrataError::InvalidFormat(format!(
                    "aggregate page has invalid length {}",
                    bytes.len()
                )));
            }
            let bucket_interval = bytes.get_u64_le();
            let start_time = bytes.get_u64_le();
            if bucket_interval == 0 {
                return Err(StrataError::InvalidFormat(
                    "aggregate page has zero bucket interval".into(),
                ));
            }
            let mut buckets = Vec::with_capacity(bytes.len() / 8);
            while bytes.has_remaining() {
                buckets.push(bytes.get_f64_le());
            }
            Ok(Column::Aggregate(AggregateColumn::from_parts(
                kind,
                buckets,
                start_time,
                bucket_interval,
            )))
        }
        ColumnKind::Avg | ColumnKind::RawRead => Err(StrataError::InvalidFormat(format!(
            "{kind:?} columns are never stored in pages"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimeRange;

    const AGGREGATE_PAGE: &[u8] = &[
        15, 0, 0, 0, 0, 0, 0, 0, // bucket interval
        45, 0, 0, 0, 0, 0, 0, 0, // start time
        0, 0, 0, 0, 0, 0, 240, 63, // 1.0
        0, 0, 0, 0, 0, 0, 0, 64, // 2.0
        0, 0, 0, 0, 0, 0, 8, 64, // 3.0
        0, 0, 0, 0, 0, 0, 16, 64, // 4.0
        0, 0, 0, 0, 0, 0, 20, 64, // 5.0
    ];

    #[test]
    fn test_aggregate_to_bytes() {
        for kind in [
            ColumnKind::Sum,
            ColumnKind::Count,
            ColumnKind::Min,
            ColumnKind::Max,
            ColumnKind::Last,
        ] {
            let column = Column::Aggregate(AggregateColumn::from_parts(
                kind,
                vec![1.0, 2.0, 3.0, 4.0, 5.0],
                45,
                15,
            ));
            assert_eq!(column_to_bytes(&column).unwrap().as_ref(), AGGREGATE_PAGE);
        }
    }

    #[test]
    fn test_aggregate_from_bytes() {
        let column = column_from_bytes(AGGREGATE_PAGE, ColumnKind::Sum).unwrap();
        let Column::Aggregate(aggregate) = column else {
            panic!("expected an aggregate column");
        };
        assert_eq!(aggregate.kind(), ColumnKind::Sum);
        assert_eq!(aggregate.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(aggregate.time_range(), TimeRange::new(45, 120));
    }

    #[test]
    fn test_raw_timestamps_round_trip() {
        let expected: &[u8] = &[
            1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0,
            0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0,
        ];
        let column = Column::RawTimestamps(RawTimestampsColumn::new(vec![1, 2, 3, 4, 5]));
        let bytes = column_to_bytes(&column).unwrap();
        assert_eq!(bytes.as_ref(), expected);

        let decoded = column_from_bytes(&bytes, ColumnKind::RawTimestamps).unwrap();
        assert_eq!(decoded.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(decoded.time_range(), TimeRange::new(1, 6));
    }

    #[test]
    fn test_raw_values_round_trip() {
        let expected: &[u8] = &[
            0, 0, 0, 0, 0, 0, 240, 63, 0, 0, 0, 0, 0, 0, 0, 64, 0, 0, 0, 0, 0, 0, 8, 64, 0, 0,
            0, 0, 0, 0, 16, 64, 0, 0, 0, 0, 0, 0, 20, 64,
        ];
        let column = Column::RawValues(RawValuesColumn::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]));
        let bytes = column_to_bytes(&column).unwrap();
        assert_eq!(bytes.as_ref(), expected);

        let decoded = column_from_bytes(&bytes, ColumnKind::RawValues).unwrap();
        assert_eq!(decoded.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_round_trip_preserves_column() {
        let original = AggregateColumn::from_parts(
            ColumnKind::Max,
            vec![f64::MIN, 7.5, -2.25, 1e300],
            30,
            10,
        );
        let bytes = column_to_bytes(&Column::Aggregate(original.clone())).unwrap();
        let Column::Aggregate(decoded) = column_from_bytes(&bytes, ColumnKind::Max).unwrap()
        else {
            panic!("expected an aggregate column");
        };
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_invalid_payloads_rejected() {
        let err = column_from_bytes(&[1, 2, 3], ColumnKind::Sum).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFormat(_)));

        let err = column_from_bytes(&[0; 21], ColumnKind::Sum).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFormat(_)));

        let err = column_from_bytes(&[0; 16], ColumnKind::Sum).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFormat(_)));

        let err = column_from_bytes(&[1, 2, 3], ColumnKind::RawTimestamps).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFormat(_)));

        let err = column_from_bytes(&[0; 8], ColumnKind::Avg).unwrap_err();
        assert!(matches!(err, StrataError::InvalidFormat(_)));
    }

    #[test]
    fn test_raw_read_not_serializable() {
        let column = Column::RawRead(super::super::RawReadColumn::default());
        assert!(column_to_bytes(&column).is_err());
    }
}
