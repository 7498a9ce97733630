//! Forward-only cursor over the entries of a container archive.
//!
//! [`ArchiveHandle`] presents one sequential-access contract over the four
//! container formats comic books ship in. The handle moves in one direction
//! only: [`next_header`](ArchiveHandle::next_header) advances to the next
//! regular-file entry and [`read_data`](ArchiveHandle::read_data) streams
//! that entry's bytes. Going backward means [`reset`](ArchiveHandle::reset),
//! which costs as much as reopening the file.
//!
//! # Example
//!
//! ```rust,no_run
//! use cbarchive::{ArchiveFormat, ArchiveHandle, Result};
//!
//! fn list(path: &str) -> Result<()> {
//!     let mut handle = ArchiveHandle::new();
//!     handle.set_format(ArchiveFormat::Zip)?;
//!     handle.open(path)?;
//!
//!     while let Some(entry) = handle.next_header()? {
//!         println!("{}\t{}", entry.size(), entry.pathname());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The [`Entry`] view borrows the handle, so holding it across the next
//! `next_header` or `reset` call does not compile.

pub mod detect;

#[cfg(any(feature = "zip", feature = "sevenz", feature = "rar"))]
mod buffer;
#[cfg(feature = "rar")]
mod rar;
#[cfg(feature = "sevenz")]
mod sevenz;
#[cfg(feature = "tar")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

pub use detect::{ArchiveFormat, detect_format, detect_format_from_reader};

use std::borrow::{Borrow, Cow};
use std::path::{Path, PathBuf};

use crate::config::ReaderConfig;
use crate::stats::CursorStats;
use crate::{Error, Result};

/// Name of an entry as stored in the archive.
///
/// Names are kept as raw bytes so that every lookup compares exactly what
/// the decoder reported. Use [`to_string_lossy`](Self::to_string_lossy) for
/// display and collation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryName(Vec<u8>);

impl EntryName {
    /// Creates an entry name from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw name bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the name, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns the name as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Returns the last path component.
    ///
    /// Both `/` and `\` are treated as separators.
    pub fn file_name(&self) -> &[u8] {
        match self.0.iter().rposition(|&b| b == b'/' || b == b'\\') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    /// Returns the text after the last `.` in the whole name, lowercased.
    ///
    /// Returns `None` when the name contains no `.`.
    pub fn extension(&self) -> Option<String> {
        let dot = self.0.iter().rposition(|&b| b == b'.')?;
        Some(String::from_utf8_lossy(&self.0[dot + 1..]).to_lowercase())
    }
}

impl Borrow<[u8]> for EntryName {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for EntryName {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

impl From<String> for EntryName {
    fn from(name: String) -> Self {
        Self(name.into_bytes())
    }
}

impl From<&[u8]> for EntryName {
    fn from(name: &[u8]) -> Self {
        Self(name.to_vec())
    }
}

impl From<Vec<u8>> for EntryName {
    fn from(name: Vec<u8>) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for EntryName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for EntryName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl std::fmt::Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Metadata of a regular-file entry, as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryHeader {
    pub(crate) name: EntryName,
    pub(crate) size: u64,
    pub(crate) encrypted: bool,
}

/// Borrowed view of the entry the cursor is positioned at.
///
/// Valid until the handle is advanced, reset or closed.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    header: &'a EntryHeader,
}

impl<'a> Entry<'a> {
    /// Entry name in the archive's native encoding.
    pub fn pathname(&self) -> &'a EntryName {
        &self.header.name
    }

    /// Declared uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.header.size
    }

    /// Whether the entry's data is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.header.encrypted
    }
}

/// Sequential access to the entries of one container format.
pub(crate) trait EntryCursor {
    /// Advances to the next regular file, or `None` at end of stream.
    fn next_header(&mut self) -> Result<Option<EntryHeader>>;

    /// Reads decompressed bytes of the current entry; 0 once exhausted.
    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Format-specific decoder, chosen once when the archive is opened.
enum Decoder {
    #[cfg(feature = "zip")]
    Zip(zip::ZipCursor),
    #[cfg(feature = "tar")]
    Tar(tar::TarCursor),
    #[cfg(feature = "sevenz")]
    SevenZip(sevenz::SevenZipCursor),
    #[cfg(feature = "rar")]
    Rar(rar::RarCursor),
}

impl Decoder {
    fn open(format: ArchiveFormat, path: &Path, config: &ReaderConfig) -> Result<Self> {
        match format {
            #[cfg(feature = "zip")]
            ArchiveFormat::Zip => zip::ZipCursor::open(path, config).map(Decoder::Zip),
            #[cfg(feature = "tar")]
            ArchiveFormat::Tar => tar::TarCursor::open(path, config).map(Decoder::Tar),
            #[cfg(feature = "sevenz")]
            ArchiveFormat::SevenZip => {
                sevenz::SevenZipCursor::open(path, config).map(Decoder::SevenZip)
            }
            #[cfg(feature = "rar")]
            ArchiveFormat::Rar => rar::RarCursor::open(path, config).map(Decoder::Rar),
            #[allow(unreachable_patterns)]
            format => Err(Error::UnsupportedFormat { format }),
        }
    }

    fn cursor(&mut self) -> &mut dyn EntryCursor {
        match *self {
            #[cfg(feature = "zip")]
            Decoder::Zip(ref mut cursor) => cursor,
            #[cfg(feature = "tar")]
            Decoder::Tar(ref mut cursor) => cursor,
            #[cfg(feature = "sevenz")]
            Decoder::SevenZip(ref mut cursor) => cursor,
            #[cfg(feature = "rar")]
            Decoder::Rar(ref mut cursor) => cursor,
        }
    }
}

/// Builds the [`Error::Open`] for a decoder diagnostic.
pub(crate) fn open_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Forward-only cursor over the regular-file entries of an archive.
///
/// The handle owns its decoder and the file it reads from. It is not meant
/// to be shared between threads; give each reader its own handle.
///
/// States: no format bound, format bound but not open, open with no current
/// entry, open with a current entry. Querying the current entry when there
/// is none is a programming error and panics.
pub struct ArchiveHandle {
    format: Option<ArchiveFormat>,
    path: Option<PathBuf>,
    decoder: Option<Decoder>,
    current: Option<EntryHeader>,
    config: ReaderConfig,
    stats: CursorStats,
}

impl Default for ArchiveHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("format", &self.format)
            .field("path", &self.path)
            .field("open", &self.decoder.is_some())
            .field("current", &self.current)
            .field("stats", &self.stats)
            .finish()
    }
}

impl ArchiveHandle {
    /// Creates a handle with no format bound and default configuration.
    pub fn new() -> Self {
        Self::with_config(ReaderConfig::default())
    }

    /// Creates a handle with no format bound.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            format: None,
            path: None,
            decoder: None,
            current: None,
            config,
            stats: CursorStats::default(),
        }
    }

    /// Binds the container format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the backend for `format` was
    /// not compiled in. The handle stays unbound in that case.
    ///
    /// # Panics
    ///
    /// Panics if a format is already bound.
    pub fn set_format(&mut self, format: ArchiveFormat) -> Result<()> {
        assert!(
            self.format.is_none(),
            "archive format already set to {}",
            self.format.map(|f| f.name()).unwrap_or_default()
        );

        if !format.is_supported() {
            return Err(Error::UnsupportedFormat { format });
        }

        self.format = Some(format);
        Ok(())
    }

    /// Returns the bound format.
    pub fn format(&self) -> Option<ArchiveFormat> {
        self.format
    }

    /// Returns the configuration this handle reads with.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Opens the file at `path` and positions the cursor before its first entry.
    ///
    /// Opening an already open handle discards the previous decoder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] carrying the decoder's diagnostic if the
    /// container cannot be opened.
    ///
    /// # Panics
    ///
    /// Panics if no format is bound.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let format = self.bound_format();
        let path = path.as_ref();

        self.current = None;
        self.decoder = None;
        self.path = Some(path.to_path_buf());

        let decoder = Decoder::open(format, path, &self.config)?;
        self.decoder = Some(decoder);
        self.stats.record_open();
        log::debug!("Opened {} archive {}", format, path.display());
        Ok(())
    }

    /// Returns the path of the last [`open`](Self::open) call.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns whether a decoder is active.
    pub fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    /// Advances the cursor to the next regular-file entry.
    ///
    /// Directories, links and other non-regular entries are skipped. Returns
    /// `Ok(None)` at end of stream. On error the current entry is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] before [`open`](Self::open), or the
    /// decoder's fault as [`Error::Stream`].
    pub fn next_header(&mut self) -> Result<Option<Entry<'_>>> {
        self.current = None;
        let decoder = self.decoder.as_mut().ok_or(Error::NotOpen)?;

        match decoder.cursor().next_header()? {
            Some(header) => {
                self.stats.record_header();
                let header = self.current.insert(header);
                Ok(Some(Entry { header }))
            }
            None => Ok(None),
        }
    }

    /// Returns whether the cursor is positioned at an entry.
    pub fn has_current_entry(&self) -> bool {
        self.current.is_some()
    }

    /// Returns a view of the current entry, if any.
    pub fn current_entry(&self) -> Option<Entry<'_>> {
        self.current.as_ref().map(|header| Entry { header })
    }

    /// Returns the current entry's name.
    ///
    /// # Panics
    ///
    /// Panics if there is no current entry.
    pub fn current_entry_pathname(&self) -> &EntryName {
        &self.expect_current().name
    }

    /// Returns the current entry's declared size.
    ///
    /// # Panics
    ///
    /// Panics if there is no current entry.
    pub fn current_entry_size(&self) -> u64 {
        self.expect_current().size
    }

    /// Returns whether the current entry is encrypted.
    ///
    /// # Panics
    ///
    /// Panics if there is no current entry.
    pub fn current_entry_is_encrypted(&self) -> bool {
        self.expect_current().encrypted
    }

    /// Reads up to `buf.len()` bytes of the current entry's content.
    ///
    /// Returns the number of bytes written; 0 means the entry is exhausted.
    /// Consecutive calls continue where the previous one stopped.
    ///
    /// # Errors
    ///
    /// Returns the decoder's fault as [`Error::Decompress`].
    ///
    /// # Panics
    ///
    /// Panics if there is no current entry.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.expect_current();
        let decoder = self.decoder.as_mut().ok_or(Error::NotOpen)?;

        let read = decoder.cursor().read_data(buf)?;
        self.stats.record_read(read);
        Ok(read)
    }

    /// Discards the decoder and starts over at the beginning of the same file.
    ///
    /// This is the only way to move backward. Resetting twice in a row leaves
    /// the handle in the same state as resetting once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] if the handle was never opened, or
    /// [`Error::Open`] if the file can no longer be opened.
    pub fn reset(&mut self) -> Result<()> {
        let format = self.bound_format();
        let path = self.path.clone().ok_or(Error::NotOpen)?;

        self.current = None;
        self.decoder = None;

        let decoder = Decoder::open(format, &path, &self.config)?;
        self.decoder = Some(decoder);
        self.stats.record_reset();
        log::debug!("Reset cursor to start of {}", path.display());
        Ok(())
    }

    /// Releases the decoder and its file. The path is remembered.
    pub fn close(&mut self) {
        self.current = None;
        self.decoder = None;
    }

    /// Returns cursor statistics accumulated since the handle was created.
    pub fn stats(&self) -> CursorStats {
        self.stats
    }

    fn bound_format(&self) -> ArchiveFormat {
        match self.format {
            Some(format) => format,
            None => panic!("archive format must be set before opening"),
        }
    }

    fn expect_current(&self) -> &EntryHeader {
        match self.current.as_ref() {
            Some(header) => header,
            None => panic!("no current archive entry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_extension() {
        assert_eq!(EntryName::from("page01.JPG").extension().as_deref(), Some("jpg"));
        assert_eq!(EntryName::from("a/b.c/page").extension().as_deref(), Some("c/page"));
        assert_eq!(EntryName::from("README").extension(), None);
        assert_eq!(EntryName::from("trailing.").extension().as_deref(), Some(""));
    }

    #[test]
    fn test_entry_name_file_name() {
        assert_eq!(EntryName::from("dir/sub/._page.png").file_name(), b"._page.png");
        assert_eq!(EntryName::from("dir\\page.png").file_name(), b"page.png");
        assert_eq!(EntryName::from("page.png").file_name(), b"page.png");
    }

    #[test]
    fn test_entry_name_lossy() {
        let name = EntryName::new(vec![b'p', 0xFF, b'.', b'j', b'p', b'g']);
        assert_eq!(name.to_string_lossy(), "p\u{FFFD}.jpg");
        assert_eq!(name.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn test_entry_name_borrow_lookup() {
        let mut names = std::collections::HashSet::new();
        names.insert(EntryName::from("cover.png"));
        assert!(names.contains(b"cover.png".as_slice()));
        assert!(EntryName::from("cover.png") == "cover.png");
    }

    #[test]
    fn test_new_handle_state() {
        let handle = ArchiveHandle::new();
        assert_eq!(handle.format(), None);
        assert!(!handle.is_open());
        assert!(!handle.has_current_entry());
        assert!(handle.current_entry().is_none());
        assert_eq!(handle.stats(), CursorStats::default());
    }

    #[test]
    #[should_panic(expected = "already set")]
    fn test_set_format_twice_panics() {
        let mut handle = ArchiveHandle::new();
        let _ = handle.set_format(ArchiveFormat::Tar);
        let _ = handle.set_format(ArchiveFormat::Tar);
    }

    #[test]
    #[should_panic(expected = "must be set")]
    fn test_open_without_format_panics() {
        let mut handle = ArchiveHandle::new();
        let _ = handle.open("book.cbz");
    }

    #[test]
    #[should_panic(expected = "no current archive entry")]
    fn test_current_entry_query_panics() {
        let handle = ArchiveHandle::new();
        handle.current_entry_size();
    }

    #[test]
    #[cfg(feature = "tar")]
    fn test_next_header_before_open() {
        let mut handle = ArchiveHandle::new();
        handle.set_format(ArchiveFormat::Tar).unwrap();
        assert!(matches!(handle.next_header(), Err(Error::NotOpen)));
        assert!(matches!(handle.reset(), Err(Error::NotOpen)));
    }

    #[test]
    #[cfg(not(feature = "rar"))]
    fn test_set_format_unsupported_backend() {
        let mut handle = ArchiveHandle::new();
        let err = handle.set_format(ArchiveFormat::Rar).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedFormat {
                format: ArchiveFormat::Rar
            }
        ));
        assert_eq!(handle.format(), None);
    }

    #[test]
    #[cfg(feature = "zip")]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ArchiveHandle::new();
        handle.set_format(ArchiveFormat::Zip).unwrap();

        let err = handle.open(dir.path().join("missing.cbz")).unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(!handle.is_open());
        assert_eq!(handle.stats().opens, 0);
    }
}
