//! Disk-backed page store
//!
//! One file per page under a configured directory; the filename is the
//! page id, a random UUIDv4. Writes replace the whole file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

use super::{PageId, PageStore};
use crate::{Result, StrataError};

/// Page store keeping each page as a file in one directory
pub struct DiskPageStore {
    dir: PathBuf,
}

impl DiskPageStore {
    /// Open a page store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn page_path(&self, page_id: &PageId) -> PathBuf {
        self.dir.join(page_id)
    }

    /// Directory holding the pages
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PageStore for DiskPageStore {
    fn create_page(&self) -> Result<PageId> {
        loop {
            let page_id = Uuid::new_v4().to_string();
            let path = self.page_path(&page_id);
            match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(page_id),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read(&self, page_id: &PageId) -> Result<Bytes> {
        match fs::read(self.page_path(page_id)) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StrataError::PageNotFound(page_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, page_id: &PageId, bytes: &[u8]) -> Result<()> {
        fs::write(self.page_path(page_id), bytes)?;
        Ok(())
    }

    fn delete_page(&self, page_id: &PageId) -> Result<()> {
        match fs::remove_file(self.page_path(page_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StrataError::PageNotFound(page_id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
