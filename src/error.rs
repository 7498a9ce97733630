//! Error types for comic-book archive access.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening an archive, building its page catalog, or
//! fetching a page, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! Failures fall into two groups. Load failures (see
//! [`Error::is_load_failure`]) abort opening a document entirely; they carry
//! the short, user-facing reason the catalog could not be built. Everything
//! else is a local failure of one operation: a page that cannot be fetched
//! leaves the rest of the document usable.
//!
//! ```rust,no_run
//! use cbarchive::{ComicDocument, Error};
//!
//! fn open_for_display(path: &str) -> Option<ComicDocument> {
//!     match ComicDocument::open(path) {
//!         Ok(document) => Some(document),
//!         Err(Error::ArchiveEncrypted) => {
//!             eprintln!("This comic is password protected.");
//!             None
//!         }
//!         Err(e) => {
//!             eprintln!("{}", e.user_message());
//!             None
//!         }
//!     }
//! }
//! ```
//!
//! Programming errors (querying the current entry when there is none,
//! binding a format twice) are not represented here: they panic.

use std::io;
use std::path::PathBuf;

use crate::archive::ArchiveFormat;

/// The main error type for archive and page operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system operations |
/// | Container | [`Open`][Self::Open], [`Stream`][Self::Stream], [`Decompress`][Self::Decompress] | Decoder faults |
/// | Load | [`FileCorrupted`][Self::FileCorrupted], [`ArchiveEncrypted`][Self::ArchiveEncrypted], [`NoSupportedImages`][Self::NoSupportedImages], [`NoFiles`][Self::NoFiles] | Catalog construction |
/// | Fetch | [`PageNotFound`][Self::PageNotFound], [`PageOutOfRange`][Self::PageOutOfRange], [`Image`][Self::Image] | Per-page failures |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred outside the container decoder.
    ///
    /// Returned by operations that touch the file system directly, such as
    /// [`ComicDocument::save_original`](crate::ComicDocument::save_original)
    /// or format detection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container could not be opened.
    ///
    /// The message is the decoder's own diagnostic: missing file, bad
    /// signature, truncated central directory, unsupported compression
    /// method present in this archive instance.
    #[error("Error opening archive: {message}")]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Decoder diagnostic.
        message: String,
    },

    /// The decoder reported a fault while advancing to the next header.
    #[error("Error reading archive: {0}")]
    Stream(String),

    /// The decoder reported a fault while producing entry data.
    #[error("Failed to decompress data: {0}")]
    Decompress(String),

    /// A cursor operation was attempted before the archive was opened.
    #[error("Archive is not open")]
    NotOpen,

    /// Support for this container format was not compiled in.
    ///
    /// # Recovery
    ///
    /// Enable the corresponding feature flag when building:
    /// ```toml
    /// cbarchive = { version = "0.3", features = ["rar"] }
    /// ```
    #[error("Support for {format} archives is not enabled in this build")]
    UnsupportedFormat {
        /// The format whose backend is missing.
        format: ArchiveFormat,
    },

    /// The container format of a file could not be determined.
    #[error("Unknown archive format: {}", path.display())]
    UnknownFormat {
        /// Path that was inspected.
        path: PathBuf,
    },

    /// The archive could not be opened or scanned.
    ///
    /// The low-level decoder message is logged rather than carried here; it
    /// is rarely useful to a reader of the comic.
    #[error("File is corrupted")]
    FileCorrupted,

    /// Every candidate page in the archive is encrypted.
    #[error("Archive is encrypted")]
    ArchiveEncrypted,

    /// The archive only holds image types no installed decoder can read.
    #[error("No supported images in archive")]
    NoSupportedImages,

    /// The archive holds no page candidates at all.
    #[error("No files in archive")]
    NoFiles,

    /// A catalog page was not encountered while scanning the archive.
    ///
    /// Should not happen for names taken from the catalog; indicates the file
    /// changed or is damaged after the document was opened.
    #[error("Page '{name}' not found in archive")]
    PageNotFound {
        /// The requested entry name.
        name: String,
    },

    /// A page index beyond the end of the catalog was requested.
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of pages in the catalog.
        count: usize,
    },

    /// The image decoder rejected the page data.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Returns `true` for the four reasons a page catalog cannot be built.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::FileCorrupted | Error::ArchiveEncrypted | Error::NoSupportedImages | Error::NoFiles
        )
    }

    /// Returns a short message suitable for showing to an end user.
    ///
    /// Container faults collapse to "File is corrupted"; load failures keep
    /// their own wording.
    pub fn user_message(&self) -> String {
        match self {
            Error::Open { .. } | Error::Stream(_) | Error::Decompress(_) | Error::PageNotFound { .. } => {
                Error::FileCorrupted.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
