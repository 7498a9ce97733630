//! # cbarchive
//!
//! Sequential page access for comic book archives.
//!
//! A comic book is a container archive (`.cbz` ZIP, `.cbr` RAR, `.cb7` 7z,
//! `.cbt` TAR) full of page images. This crate opens one, scans it once to
//! build an ordered page list, and fetches individual pages on demand while
//! re-reading as little of the archive as possible.
//!
//! ## Quick Start
//!
//! ### Reading a Comic
//!
//! ```rust,no_run
//! use cbarchive::{ComicDocument, RenderRequest, Result, Rotation};
//!
//! fn main() -> Result<()> {
//!     let mut document = ComicDocument::open("issue-01.cbz")?;
//!     println!("{} pages", document.page_count());
//!
//!     for index in 0..document.page_count() {
//!         let (width, height) = document.page_size(index)?;
//!         println!("{}: {}x{}", document.pages()[index], width, height);
//!     }
//!
//!     let request = RenderRequest::new(800, 1200).rotation(Rotation::Quarter);
//!     let page = document.render_page(0, request)?;
//!     println!("rendered {}x{}", page.width(), page.height());
//!     Ok(())
//! }
//! ```
//!
//! ### Walking Archive Entries
//!
//! ```rust,no_run
//! use cbarchive::{ArchiveFormat, ArchiveHandle, Result};
//!
//! fn main() -> Result<()> {
//!     let mut handle = ArchiveHandle::new();
//!     handle.set_format(ArchiveFormat::Tar)?;
//!     handle.open("issue-01.cbt")?;
//!
//!     let mut buf = [0u8; 4096];
//!     while let Some(entry) = handle.next_header()? {
//!         println!("{} ({} bytes)", entry.pathname(), entry.size());
//!         while handle.read_data(&mut buf)? > 0 {}
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Access Model
//!
//! None of the supported container decoders can seek to an entry, so the
//! [`ArchiveHandle`] is a strict forward cursor. The [`PageCatalog`] records
//! each page's physical position, and the [`PageAccessor`] uses it to keep
//! reading forward when the next requested page lies ahead of the cursor.
//! Reading a comic front to back costs one pass over the archive; jumping
//! backward costs a restart.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `zip` | Yes | ZIP (`.cbz`) support |
//! | `tar` | Yes | TAR (`.cbt`) support |
//! | `sevenz` | Yes | 7z (`.cb7`) support |
//! | `image-formats` | Yes | JPEG, PNG, GIF and WebP page decoders |
//! | `rar` | No | RAR (`.cbr`) support; builds the bundled UnRAR library |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Opening a document fails with one of
//! four load failures when no page can be offered; see [`Error`] for the
//! full list.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod accessor;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod render;
pub mod stats;

pub use accessor::PageAccessor;
pub use archive::{ArchiveFormat, ArchiveHandle, Entry, EntryName, detect_format};
pub use catalog::{ExtensionClass, ImageSupport, PageCatalog, ScanReport};
pub use config::ReaderConfig;
pub use document::{ComicDocument, DocumentInfo};
pub use error::{Error, Result};
pub use render::{DimensionProbe, RenderRequest, Rotation};
pub use stats::CursorStats;
