//! In-memory page store
//!
//! Backs tests and ephemeral deployments; ids are sequential and never
//! reused even after deletion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use super::{PageId, PageStore};
use crate::{Result, StrataError};

/// Page store holding every page in a map
#[derive(Default)]
pub struct MemPageStore {
    pages: RwLock<HashMap<PageId, Bytes>>,
    next_id: AtomicU64,
}

impl MemPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live pages
    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }
}

impl PageStore for MemPageStore {
    fn create_page(&self) -> Result<PageId> {
        let page_id = format!("page-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pages.write().insert(page_id.clone(), Bytes::new());
        Ok(page_id)
    }

    fn read(&self, page_id: &PageId) -> Result<Bytes> {
        self.pages
            .read()
            .get(page_id)
            .cloned()
            .ok_or_else(|| StrataError::PageNotFound(page_id.clone()))
    }

    fn write(&self, page_id: &PageId, bytes: &[u8]) -> Result<()> {
        match self.pages.write().get_mut(page_id) {
            Some(slot) => {
                *slot = Bytes::copy_from_slice(bytes);
                Ok(())
            }
            None => Err(StrataError::PageNotFound(page_id.clone())),
        }
    }

    fn delete_page(&self, page_id: &PageId) -> Result<()> {
        self.pages
            .write()
            .remove(page_id)
            .map(|_| ())
            .ok_or_else(|| StrataError::PageNotFound(page_id.clone()))
    }
}
