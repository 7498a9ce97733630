//! Page catalog: one forward scan of an archive turned into a page list.
//!
//! [`PageCatalog::build`] opens the archive, walks every entry once, keeps
//! those that look like decodable images, and sorts them into presentation
//! order. It also remembers where each page sat in the archive so that a
//! later fetch can tell whether it may keep reading forward or must start
//! over (see [`PageAccessor`](crate::PageAccessor)).
//!
//! When no page survives the scan, the failure reason is the most specific
//! one observed, in this order: [`Error::ArchiveEncrypted`],
//! [`Error::NoSupportedImages`], [`Error::FileCorrupted`], [`Error::NoFiles`].

pub mod classify;
pub mod collate;

pub use classify::{ExtensionClass, ImageSupport};
pub use collate::compare_filenames;

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::archive::{ArchiveHandle, EntryName};
use crate::{Error, Result};

/// What a catalog scan saw besides the pages it kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// An image entry was skipped because it is encrypted.
    pub saw_encrypted: bool,
    /// An image entry was skipped because no decoder handles its type.
    pub saw_unsupported: bool,
    /// The decoder reported a fault and the scan stopped early.
    pub saw_error: bool,
}

impl ScanReport {
    /// The load failure to report when the scan kept no pages.
    pub fn failure_reason(&self) -> Error {
        if self.saw_encrypted {
            Error::ArchiveEncrypted
        } else if self.saw_unsupported {
            Error::NoSupportedImages
        } else if self.saw_error {
            Error::FileCorrupted
        } else {
            Error::NoFiles
        }
    }
}

/// Ordered list of page names plus the physical position of each.
///
/// Positions are 1-based indices into the sequence of entries the scan kept,
/// in the order the archive stores them.
#[derive(Debug, Clone)]
pub struct PageCatalog {
    pages: Vec<EntryName>,
    positions: HashMap<EntryName, NonZeroUsize>,
    report: ScanReport,
}

impl PageCatalog {
    /// Builds the catalog with one forward scan of the archive at `path`.
    ///
    /// `handle` must have its format bound. It is opened here and closed
    /// again before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileCorrupted`] if the archive cannot be opened, or
    /// one of the load failures listed in the module docs if no page is kept.
    pub fn build(
        handle: &mut ArchiveHandle,
        path: impl AsRef<Path>,
        support: &ImageSupport,
    ) -> Result<Self> {
        let path = path.as_ref();
        if let Err(e) = handle.open(path) {
            log::warn!("Failed to open {}: {}", path.display(), e);
            return Err(Error::FileCorrupted);
        }

        let result = scan(handle, support);
        handle.close();

        let (physical, report) = result;
        match Self::from_physical_order(physical, report) {
            Some(catalog) => {
                log::debug!(
                    "Cataloged {} pages from {}",
                    catalog.len(),
                    path.display()
                );
                Ok(catalog)
            }
            None => Err(report.failure_reason()),
        }
    }

    /// Builds a catalog from names in physical order.
    ///
    /// Returns `None` if `physical` is empty. Duplicate names keep the
    /// position of their first occurrence.
    pub fn from_physical_order(physical: Vec<EntryName>, report: ScanReport) -> Option<Self> {
        if physical.is_empty() {
            return None;
        }

        let mut positions = HashMap::with_capacity(physical.len());
        for (index, name) in physical.iter().enumerate() {
            let position = NonZeroUsize::MIN.saturating_add(index);
            positions.entry(name.clone()).or_insert(position);
        }

        let mut pages = physical;
        pages.sort_by(|a, b| compare_filenames(&a.to_string_lossy(), &b.to_string_lossy()));

        Some(Self {
            pages,
            positions,
            report,
        })
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always `false`; a catalog holds at least one page.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Name of the page at `index` in presentation order.
    pub fn page(&self, index: usize) -> Option<&EntryName> {
        self.pages.get(index)
    }

    /// Page names in presentation order.
    pub fn pages(&self) -> &[EntryName] {
        &self.pages
    }

    /// Physical position of `name`, or `None` if it is not a page.
    pub fn position_of(&self, name: &[u8]) -> Option<NonZeroUsize> {
        self.positions.get(name).copied()
    }

    /// What the scan skipped on the way.
    pub fn report(&self) -> ScanReport {
        self.report
    }
}

/// Walks every entry once, collecting accepted page names in physical order.
fn scan(handle: &mut ArchiveHandle, support: &ImageSupport) -> (Vec<EntryName>, ScanReport) {
    let fork_prefix = handle.config().resource_fork_prefix.clone().into_bytes();
    let mut report = ScanReport::default();
    let mut physical = Vec::new();

    loop {
        let entry = match handle.next_header() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Stopped scanning archive: {}", e);
                report.saw_error = true;
                break;
            }
        };
        let name = entry.pathname();

        if !fork_prefix.is_empty() && name.file_name().starts_with(&fork_prefix) {
            log::debug!("Skipping resource fork '{}'", name);
            continue;
        }

        let class = match name.extension() {
            Some(extension) => support.classify(&extension),
            None => ExtensionClass::Unknown,
        };
        match class {
            ExtensionClass::Unknown => {
                log::debug!("Skipping '{}': not an image", name);
                continue;
            }
            ExtensionClass::Unsupported => {
                log::debug!("Skipping '{}': no decoder for this image type", name);
                report.saw_unsupported = true;
                continue;
            }
            ExtensionClass::Supported => {}
        }

        if entry.is_encrypted() {
            log::debug!("Skipping '{}': encrypted", name);
            report.saw_encrypted = true;
            continue;
        }

        physical.push(name.clone());
    }

    (physical, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<EntryName> {
        list.iter().map(|s| EntryName::from(*s)).collect()
    }

    #[test]
    fn test_failure_reason_priority() {
        let all = ScanReport {
            saw_encrypted: true,
            saw_unsupported: true,
            saw_error: true,
        };
        assert!(matches!(all.failure_reason(), Error::ArchiveEncrypted));

        let report = ScanReport {
            saw_unsupported: true,
            saw_error: true,
            ..Default::default()
        };
        assert!(matches!(report.failure_reason(), Error::NoSupportedImages));

        let report = ScanReport {
            saw_error: true,
            ..Default::default()
        };
        assert!(matches!(report.failure_reason(), Error::FileCorrupted));

        assert!(matches!(
            ScanReport::default().failure_reason(),
            Error::NoFiles
        ));
    }

    #[test]
    fn test_from_physical_order() {
        let catalog = PageCatalog::from_physical_order(
            names(&["page_002.jpg", "cover.PNG", "page_001.jpg"]),
            ScanReport::default(),
        )
        .unwrap();

        let order: Vec<String> = catalog.pages().iter().map(|n| n.to_string()).collect();
        assert_eq!(order, ["cover.PNG", "page_001.jpg", "page_002.jpg"]);

        assert_eq!(catalog.position_of(b"page_002.jpg").map(|p| p.get()), Some(1));
        assert_eq!(catalog.position_of(b"cover.PNG").map(|p| p.get()), Some(2));
        assert_eq!(catalog.position_of(b"page_001.jpg").map(|p| p.get()), Some(3));
        assert_eq!(catalog.position_of(b"missing.jpg"), None);
    }

    #[test]
    fn test_from_physical_order_empty() {
        assert!(PageCatalog::from_physical_order(Vec::new(), ScanReport::default()).is_none());
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let catalog = PageCatalog::from_physical_order(
            names(&["a.png", "b.png", "a.png"]),
            ScanReport::default(),
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.position_of(b"a.png").map(|p| p.get()), Some(1));
    }

    #[test]
    fn test_page_index_bounds() {
        let catalog =
            PageCatalog::from_physical_order(names(&["1.png"]), ScanReport::default()).unwrap();
        assert!(catalog.page(0).is_some());
        assert!(catalog.page(1).is_none());
        assert!(!catalog.is_empty());
    }
}
