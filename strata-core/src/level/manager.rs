//! Level manager - the rollover cascade
//!
//! Orders the levels finest-first, routes flushed columns into level 0,
//! cascades full levels into their successors, and fans reads out across
//! every tier.

use std::sync::Arc;

use tracing::debug;

use crate::column::Column;
use crate::page_store::PageStore;
use crate::{ColumnKind, Result, TimeRange};

use super::{Level, LevelOptions};

/// The ordered cascade of persistent levels for one metric
pub struct LevelManager {
    levels: Vec<Level>,
}

impl LevelManager {
    /// Build the cascade over a shared page store
    pub fn new(options: &[LevelOptions], store: Arc<dyn PageStore>) -> Self {
        let levels = options
            .iter()
            .map(|level| Level::new(level.clone(), Arc::clone(&store)))
            .collect();
        Self { levels }
    }

    /// Persist extracted memtable columns into level 0, then run one
    /// cascade pass. A single pass suffices: a level fills over many
    /// writes, and one write adds at most one flush worth of data.
    pub fn write(&mut self, columns: Vec<Column>) -> Result<()> {
        if self.levels.is_empty() {
            return Ok(());
        }
        for column in columns {
            self.levels[0].write(column)?;
        }
        self.cascade()
    }

    fn cascade(&mut self) -> Result<()> {
        for k in 0..self.levels.len().saturating_sub(1) {
            if self.levels[k].need_merge() {
                debug!(level = k, "level rolled over into level {}", k + 1);
                let (head, tail) = self.levels.split_at_mut(k + 1);
                tail[0].move_pages_from(&mut head[k])?;
            }
        }
        Ok(())
    }

    /// Read every level over `range`, merging deepest (coarsest, oldest)
    /// to shallowest so that newer, finer data wins where kinds require an
    /// order. Assumes a timestamp is resident in exactly one level, which
    /// the append-only cascade maintains.
    pub fn read(&self, range: TimeRange, kind: ColumnKind) -> Result<Option<Column>> {
        let mut result: Option<Column> = None;
        for level in self.levels.iter().rev() {
            match (result.as_mut(), level.read(range, kind)?) {
                (Some(merged), Some(column)) => merged.merge(column)?,
                (None, Some(column)) => result = Some(column),
                (_, None) => {}
            }
        }
        Ok(result)
    }
}
