//! Page store abstraction
//!
//! Levels persist each column as one page: an opaque byte blob addressed
//! by a globally unique id. The store does not interpret page contents and
//! never reuses an id.

mod disk;
mod memory;

pub use disk::DiskPageStore;
pub use memory::MemPageStore;

use bytes::Bytes;

use crate::Result;

/// Opaque handle to a page
pub type PageId = String;

/// Blob storage for serialized columns
///
/// Implementations are shared by every level of every metric; methods take
/// `&self` and handle their own interior mutability.
pub trait PageStore: Send + Sync {
    /// Allocate an empty page under a fresh, never-reused id
    fn create_page(&self) -> Result<PageId>;

    /// Fetch a page's contents; unknown ids fail
    fn read(&self, page_id: &PageId) -> Result<Bytes>;

    /// Replace a page's contents
    fn write(&self, page_id: &PageId, bytes: &[u8]) -> Result<()>;

    /// Remove a page; unknown ids fail, the id is never handed out again
    fn delete_page(&self, page_id: &PageId) -> Result<()>;
}
