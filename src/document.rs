//! Comic book documents.
//!
//! [`ComicDocument`] ties an [`ArchiveHandle`], the [`PageCatalog`] built
//! from it, and the image boundary together into the interface a viewer
//! needs: page count, page sizes, rendered pages.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::accessor::PageAccessor;
use crate::archive::{ArchiveFormat, ArchiveHandle, EntryName, detect_format};
use crate::catalog::{ImageSupport, PageCatalog};
use crate::config::ReaderConfig;
use crate::render::{self, DimensionProbe, RenderRequest, Rotation};
use crate::stats::CursorStats;
use crate::{Error, Result};

/// Summary information about an open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Container format.
    pub format: ArchiveFormat,
    /// Number of pages.
    pub page_count: usize,
    /// Size of the archive file in bytes.
    pub file_size: u64,
}

/// An open comic book.
///
/// Page indices are 0-based positions in presentation order.
///
/// # Example
///
/// ```rust,no_run
/// use cbarchive::{ComicDocument, RenderRequest, Result};
///
/// fn first_page_thumbnail(path: &str) -> Result<()> {
///     let mut document = ComicDocument::open(path)?;
///     let (width, height) = document.page_size(0)?;
///
///     let image = document.render_page(0, RenderRequest::new(width / 4, height / 4))?;
///     image.save("thumbnail.png").map_err(cbarchive::Error::Image)?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ComicDocument {
    path: PathBuf,
    format: ArchiveFormat,
    handle: ArchiveHandle,
    catalog: PageCatalog,
}

impl ComicDocument {
    /// Opens a comic book, detecting its container format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFormat`] if the format cannot be detected,
    /// otherwise the errors of [`open_with`](Self::open_with).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        Self::open_with(path, format, ImageSupport::global(), ReaderConfig::default())
    }

    /// Opens a comic book of a known format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the format's backend is not
    /// compiled in, or one of the load failures
    /// ([`Error::is_load_failure`]) if no page catalog can be built.
    pub fn open_with(
        path: impl AsRef<Path>,
        format: ArchiveFormat,
        support: &ImageSupport,
        config: ReaderConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut handle = ArchiveHandle::with_config(config);
        handle.set_format(format)?;

        let catalog = PageCatalog::build(&mut handle, path, support)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            handle,
            catalog,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container format.
    pub fn format(&self) -> ArchiveFormat {
        self.format
    }

    /// Number of pages; at least 1.
    pub fn page_count(&self) -> usize {
        self.catalog.len()
    }

    /// Name of the page at `index`.
    pub fn page_name(&self, index: usize) -> Option<&EntryName> {
        self.catalog.page(index)
    }

    /// Page names in presentation order.
    pub fn pages(&self) -> &[EntryName] {
        self.catalog.pages()
    }

    /// The page catalog.
    pub fn catalog(&self) -> &PageCatalog {
        &self.catalog
    }

    /// Cursor statistics of the underlying archive handle.
    pub fn stats(&self) -> CursorStats {
        self.handle.stats()
    }

    /// Returns the natural size of page `index` in pixels.
    ///
    /// Reads only as much of the page as the image header needs.
    pub fn page_size(&mut self, index: usize) -> Result<(u32, u32)> {
        let name = self.page_name_checked(index)?.clone();
        let block_size = self.handle.config().probe_block_size;

        let mut probe = DimensionProbe::new();
        let mut accessor = PageAccessor::new(&mut self.handle, &self.catalog);
        let found = accessor.probe_page(&name, block_size, |chunk| probe.feed(chunk))?;

        match found {
            Some(size) => Ok(size),
            None => probe.finish().inspect_err(|e| {
                log::warn!("Unable to read size of page '{}': {}", name, e);
            }),
        }
    }

    /// Returns the raw bytes of page `index`.
    pub fn page_data(&mut self, index: usize) -> Result<Vec<u8>> {
        let name = self.page_name_checked(index)?.clone();
        PageAccessor::new(&mut self.handle, &self.catalog).read_page(&name)
    }

    /// Renders page `index` at the requested size and rotation.
    pub fn render_page(&mut self, index: usize, request: RenderRequest) -> Result<DynamicImage> {
        let data = self.page_data(index)?;
        let image = render::decode_page(&data).inspect_err(|e| {
            log::warn!("Unable to decode page {}: {}", index, e);
        })?;
        Ok(render::transform(image, &request))
    }

    /// Renders page `index` scaled relative to its natural size.
    pub fn render_page_scaled(
        &mut self,
        index: usize,
        scale: f64,
        rotation: Rotation,
    ) -> Result<DynamicImage> {
        let data = self.page_data(index)?;
        let image = render::decode_page(&data).inspect_err(|e| {
            log::warn!("Unable to decode page {}: {}", index, e);
        })?;

        let (width, height) = render::scale_size((image.width(), image.height()), scale);
        let request = RenderRequest {
            width,
            height,
            rotation,
        };
        Ok(render::transform(image, &request))
    }

    /// Size of a thumbnail of page `index` at `scale`, after rotation.
    pub fn thumbnail_dimensions(
        &mut self,
        index: usize,
        scale: f64,
        rotation: Rotation,
    ) -> Result<(u32, u32)> {
        let size = self.page_size(index)?;
        Ok(rotation.apply_to_size(render::scale_size(size, scale)))
    }

    /// Copies the archive file byte for byte to `destination`.
    pub fn save_original(&self, destination: impl AsRef<Path>) -> Result<u64> {
        let mut source = fs::File::open(&self.path)?;
        let mut target = fs::File::create(destination)?;
        Ok(io::copy(&mut source, &mut target)?)
    }

    /// Format, page count and file size.
    pub fn info(&self) -> Result<DocumentInfo> {
        let file_size = fs::metadata(&self.path)?.len();
        Ok(DocumentInfo {
            format: self.format,
            page_count: self.page_count(),
            file_size,
        })
    }

    fn page_name_checked(&self, index: usize) -> Result<&EntryName> {
        self.catalog.page(index).ok_or(Error::PageOutOfRange {
            index,
            count: self.catalog.len(),
        })
    }
}
