//! Page fetching over a forward-only archive cursor.
//!
//! [`PageAccessor`] locates a page by scanning the archive, reusing the
//! cursor's position when the requested page lies ahead of it. Reading
//! pages in increasing physical order therefore costs one pass over the
//! archive; any backward jump restarts the scan from the first entry.
//!
//! Two read strategies exist:
//!
//! - [`read_page`](PageAccessor::read_page) materialises the whole entry.
//! - [`probe_page`](PageAccessor::probe_page) feeds fixed-size chunks to a
//!   callback and stops as soon as the callback has what it needs, which is
//!   all a size query requires.

use std::ops::ControlFlow;

use crate::archive::{ArchiveHandle, EntryName};
use crate::catalog::PageCatalog;
use crate::{Error, Result};

/// Upper bound on the up-front allocation for a full page read.
const INITIAL_CAPACITY: u64 = 1 << 20;

/// Fetches page bytes for one catalog through one archive handle.
#[derive(Debug)]
pub struct PageAccessor<'a> {
    handle: &'a mut ArchiveHandle,
    catalog: &'a PageCatalog,
}

impl<'a> PageAccessor<'a> {
    /// Creates an accessor. The handle must have been opened at least once.
    pub fn new(handle: &'a mut ArchiveHandle, catalog: &'a PageCatalog) -> Self {
        Self { handle, catalog }
    }

    /// Returns whether fetching `name` would restart the scan.
    ///
    /// The scan may continue only if the cursor sits at a cataloged page and
    /// `name` is physically after it.
    pub fn needs_restart(&self, name: &EntryName) -> bool {
        let Some(current) = self.handle.current_entry() else {
            return true;
        };

        match (
            self.catalog.position_of(current.pathname().as_bytes()),
            self.catalog.position_of(name.as_bytes()),
        ) {
            (Some(current), Some(requested)) => requested <= current,
            _ => true,
        }
    }

    /// Reads the complete content of page `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageNotFound`] if the scan reaches the end without
    /// meeting `name`, and [`Error::Decompress`] if the entry is larger than
    /// the configured limit or its data is damaged.
    pub fn read_page(&mut self, name: &EntryName) -> Result<Vec<u8>> {
        self.seek_to(name)?;

        let size = self.handle.current_entry_size();
        let limit = self.handle.config().max_entry_size;
        if size > limit {
            return Err(Error::Decompress(format!(
                "page '{}' is {} bytes, above the {} byte limit",
                name, size, limit
            )));
        }

        // Grow with the data actually decoded rather than the declared size.
        let mut data = Vec::with_capacity(size.min(INITIAL_CAPACITY) as usize);
        let mut chunk = vec![0u8; self.handle.config().read_buffer_size];
        while (data.len() as u64) < size {
            let want = (size - data.len() as u64).min(chunk.len() as u64) as usize;
            let read = self.handle.read_data(&mut chunk[..want])?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
        }

        if (data.len() as u64) < size {
            log::warn!(
                "Page '{}' declared {} bytes but only {} were decoded",
                name,
                size,
                data.len()
            );
        }
        Ok(data)
    }

    /// Streams page `name` in chunks of `block_size` bytes into `probe`.
    ///
    /// Reading stops when `probe` returns [`ControlFlow::Break`], whose value
    /// is returned, or when the entry is exhausted, which returns `None`.
    ///
    /// # Errors
    ///
    /// Same as [`read_page`](Self::read_page).
    pub fn probe_page<T, F>(
        &mut self,
        name: &EntryName,
        block_size: usize,
        mut probe: F,
    ) -> Result<Option<T>>
    where
        F: FnMut(&[u8]) -> ControlFlow<T>,
    {
        self.seek_to(name)?;

        let mut block = vec![0u8; block_size.max(1)];
        loop {
            let read = self.handle.read_data(&mut block)?;
            if read == 0 {
                return Ok(None);
            }
            if let ControlFlow::Break(value) = probe(&block[..read]) {
                return Ok(Some(value));
            }
        }
    }

    /// Positions the cursor at `name`, restarting the scan if needed.
    fn seek_to(&mut self, name: &EntryName) -> Result<()> {
        if self.needs_restart(name) {
            self.restart()?;
        } else {
            log::debug!("Continuing forward scan for '{}'", name);
        }

        while let Some(entry) = self.handle.next_header()? {
            if entry.pathname() == name {
                return Ok(());
            }
        }

        Err(Error::PageNotFound {
            name: name.to_string(),
        })
    }

    fn restart(&mut self) -> Result<()> {
        if self.handle.has_current_entry() {
            return self.handle.reset();
        }

        let path = self.handle.path().map(ToOwned::to_owned).ok_or(Error::NotOpen)?;
        self.handle.open(path)
    }
}
