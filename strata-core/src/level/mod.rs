//! Persistent levels
//!
//! A level is one tier of the on-disk cascade: a fixed bucket interval, a
//! rollover threshold, and a kind-to-page mapping against the shared page
//! store. Pages are never updated in place; a write reads, merges, deletes
//! and recreates.

mod manager;

pub use manager::LevelManager;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::{column_from_bytes, column_to_bytes, Column, RawReadColumn};
use crate::page_store::{PageId, PageStore};
use crate::{ColumnKind, Duration, Result, TimeRange};

/// Per-tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelOptions {
    /// Bucket resolution at this tier
    pub bucket_interval: Duration,
    /// Covered span after which the tier rolls over into the next
    pub level_duration: Duration,
    /// Persist raw columns at this tier
    #[serde(default)]
    pub store_raw: bool,
}

/// One tier of the persistent cascade
pub struct Level {
    options: LevelOptions,
    store: Arc<dyn PageStore>,
    pages: Vec<(ColumnKind, PageId)>,
    time_range: TimeRange,
}

impl Level {
    pub fn new(options: LevelOptions, store: Arc<dyn PageStore>) -> Self {
        Self {
            options,
            store,
            pages: Vec::new(),
            time_range: TimeRange::default(),
        }
    }

    pub fn bucket_interval(&self) -> Duration {
        self.options.bucket_interval
    }

    /// Union of the time ranges of every column ever written here
    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    fn find_page(&self, kind: ColumnKind) -> Option<&PageId> {
        self.pages.iter().find(|(k, _)| *k == kind).map(|(_, id)| id)
    }

    /// Persist a column. Raw columns are dropped silently when this tier
    /// does not store raw data. An existing page of the same kind is
    /// merged with the incoming column and rewritten under a fresh id.
    pub fn write(&mut self, column: Column) -> Result<()> {
        let kind = column.kind();
        if !self.options.store_raw && kind.is_raw() {
            return Ok(());
        }
        self.time_range = self.time_range.merge(&column.time_range());

        match self.pages.iter().position(|(k, _)| *k == kind) {
            None => {
                let page_id = self.store.create_page()?;
                self.store.write(&page_id, &column_to_bytes(&column)?)?;
                self.pages.push((kind, page_id));
            }
            Some(slot) => {
                let old_id = self.pages[slot].1.clone();
                let mut merged = column_from_bytes(&self.store.read(&old_id)?, kind)?;
                merged.merge(column)?;
                self.store.delete_page(&old_id)?;
                let page_id = self.store.create_page()?;
                self.store.write(&page_id, &column_to_bytes(&merged)?)?;
                self.pages[slot].1 = page_id;
            }
        }
        Ok(())
    }

    /// Read this tier's data for `kind` over `range`; `None` when the tier
    /// is empty or holds no page of that kind
    pub fn read(&self, range: TimeRange, kind: ColumnKind) -> Result<Option<Column>> {
        if self.pages.is_empty() {
            return Ok(None);
        }
        if kind == ColumnKind::RawRead {
            return self.read_raw(range);
        }
        let Some(page_id) = self.find_page(kind) else {
            return Ok(None);
        };
        let column = column_from_bytes(&self.store.read(page_id)?, kind)?;
        Ok(column.read(range))
    }

    fn read_raw(&self, range: TimeRange) -> Result<Option<Column>> {
        let Some(ts_page) = self.find_page(ColumnKind::RawTimestamps) else {
            return Ok(None);
        };
        let Some(vals_page) = self.find_page(ColumnKind::RawValues) else {
            return Ok(None);
        };
        let timestamps = column_from_bytes(&self.store.read(ts_page)?, ColumnKind::RawTimestamps)?;
        let values = column_from_bytes(&self.store.read(vals_page)?, ColumnKind::RawValues)?;
        let (Column::RawTimestamps(timestamps), Column::RawValues(values)) = (timestamps, values)
        else {
            return Ok(None);
        };
        Ok(RawReadColumn::read_pair(&timestamps, &values, range).map(Column::RawRead))
    }

    /// Absorb every page of `src`, leaving it empty. Matching interval and
    /// raw policy make this a pure pointer move; otherwise pages are
    /// rescaled in memory and rewritten through [`Level::write`].
    pub fn move_pages_from(&mut self, src: &mut Level) -> Result<()> {
        if self.options.bucket_interval == src.options.bucket_interval
            && self.options.store_raw == src.options.store_raw
        {
            self.pages.append(&mut src.pages);
        } else {
            for (kind, page_id) in std::mem::take(&mut src.pages) {
                if self.find_page(kind).is_none() {
                    if kind.is_raw() && !self.options.store_raw {
                        self.store.delete_page(&page_id)?;
                    } else {
                        self.pages.push((kind, page_id));
                    }
                    continue;
                }
                let mut column = column_from_bytes(&src.store.read(&page_id)?, kind)?;
                if let Column::Aggregate(aggregate) = &mut column {
                    aggregate.rescale(self.options.bucket_interval)?;
                }
                self.write(column)?;
                src.store.delete_page(&page_id)?;
            }
        }

        self.time_range = self.time_range.merge(&src.time_range);
        src.time_range = TimeRange::default();
        Ok(())
    }

    /// True once this tier covers its configured duration and must drain
    /// into the next
    pub fn need_merge(&self) -> bool {
        self.time_range.duration() >= self.options.level_duration
    }
}
