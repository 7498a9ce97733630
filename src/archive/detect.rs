//! Archive format detection utilities.
//!
//! This module identifies the container format of a comic book from its
//! magic bytes, its file extension, or the MIME type a file manager reports
//! for it.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::{Error, Result};

/// Container format of a comic book archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// RAR archive, legacy or RAR5 (`.cbr`).
    Rar,
    /// ZIP archive (`.cbz`).
    Zip,
    /// 7z archive (`.cb7`).
    SevenZip,
    /// TAR archive (`.cbt`).
    Tar,
}

impl ArchiveFormat {
    /// All formats, in the order detection prefers them.
    pub const ALL: [ArchiveFormat; 4] = [
        ArchiveFormat::Zip,
        ArchiveFormat::Rar,
        ArchiveFormat::SevenZip,
        ArchiveFormat::Tar,
    ];

    /// Returns the comic book file extension for this format.
    pub fn comic_extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Rar => "cbr",
            ArchiveFormat::Zip => "cbz",
            ArchiveFormat::SevenZip => "cb7",
            ArchiveFormat::Tar => "cbt",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveFormat::Rar => "RAR",
            ArchiveFormat::Zip => "ZIP",
            ArchiveFormat::SevenZip => "7-Zip",
            ArchiveFormat::Tar => "TAR",
        }
    }

    /// Returns whether a decoder for this format was compiled in.
    pub fn is_supported(&self) -> bool {
        match self {
            ArchiveFormat::Rar => cfg!(feature = "rar"),
            ArchiveFormat::Zip => cfg!(feature = "zip"),
            ArchiveFormat::SevenZip => cfg!(feature = "sevenz"),
            ArchiveFormat::Tar => cfg!(feature = "tar"),
        }
    }

    /// Identifies a format from a file extension (without the leading dot).
    ///
    /// Both the comic book extensions and the plain container extensions
    /// are recognised, case-insensitively.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cbarchive::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::from_extension("CBZ"), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::from_extension("cb7"), Some(ArchiveFormat::SevenZip));
    /// assert_eq!(ArchiveFormat::from_extension("pdf"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "cbr" | "rar" => Some(ArchiveFormat::Rar),
            "cbz" | "zip" => Some(ArchiveFormat::Zip),
            "cb7" | "7z" => Some(ArchiveFormat::SevenZip),
            "cbt" | "tar" => Some(ArchiveFormat::Tar),
            _ => None,
        }
    }

    /// Identifies a format from a MIME type.
    ///
    /// Parameters after `;` are ignored.
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        MIME_TYPES
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
            .map(|(_, format)| *format)
    }

    /// Identifies a format from the first bytes of a file.
    ///
    /// `header` should hold at least the first 262 bytes for TAR detection;
    /// shorter inputs are still matched against the leading signatures.
    pub fn from_signature(header: &[u8]) -> Option<Self> {
        for (signature, format) in SIGNATURES {
            if header.starts_with(signature) {
                return Some(*format);
            }
        }

        let ustar = TAR_USTAR_OFFSET..TAR_USTAR_OFFSET + TAR_USTAR_SIGNATURE.len();
        if header.get(ustar) == Some(TAR_USTAR_SIGNATURE) {
            return Some(ArchiveFormat::Tar);
        }

        None
    }

    /// MIME types associated with this format.
    pub fn mime_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        MIME_TYPES
            .iter()
            .filter(move |(_, format)| format == self)
            .map(|(mime, _)| *mime)
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Known container signatures.
const SIGNATURES: &[(&[u8], ArchiveFormat)] = &[
    // ZIP: 'P' 'K' 0x03 0x04 (local file header)
    (&[0x50, 0x4B, 0x03, 0x04], ArchiveFormat::Zip),
    // ZIP: 'P' 'K' 0x05 0x06 (empty archive)
    (&[0x50, 0x4B, 0x05, 0x06], ArchiveFormat::Zip),
    // ZIP: 'P' 'K' 0x07 0x08 (spanned archive marker)
    (&[0x50, 0x4B, 0x07, 0x08], ArchiveFormat::Zip),
    // RAR: 'R' 'a' 'r' '!' 0x1A 0x07 0x00
    (
        &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00],
        ArchiveFormat::Rar,
    ),
    // RAR5: 'R' 'a' 'r' '!' 0x1A 0x07 0x01 0x00
    (
        &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00],
        ArchiveFormat::Rar,
    ),
    // 7z: '7' 'z' 0xBC 0xAF 0x27 0x1C
    (
        &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        ArchiveFormat::SevenZip,
    ),
];

/// MIME types file managers report for comic books and their containers.
const MIME_TYPES: &[(&str, ArchiveFormat)] = &[
    ("application/x-cbr", ArchiveFormat::Rar),
    ("application/x-rar", ArchiveFormat::Rar),
    ("application/x-rar-compressed", ArchiveFormat::Rar),
    ("application/vnd.rar", ArchiveFormat::Rar),
    ("application/vnd.comicbook-rar", ArchiveFormat::Rar),
    ("application/x-cbz", ArchiveFormat::Zip),
    ("application/zip", ArchiveFormat::Zip),
    ("application/vnd.comicbook+zip", ArchiveFormat::Zip),
    ("application/x-cb7", ArchiveFormat::SevenZip),
    ("application/x-7z-compressed", ArchiveFormat::SevenZip),
    ("application/x-cbt", ArchiveFormat::Tar),
    ("application/x-tar", ArchiveFormat::Tar),
];

/// TAR USTAR signature at offset 257.
const TAR_USTAR_SIGNATURE: &[u8] = b"ustar";
const TAR_USTAR_OFFSET: usize = 257;

/// Bytes needed to see every signature in [`SIGNATURES`] and the USTAR magic.
const DETECT_HEADER_LEN: usize = 512;

/// Detects the archive format from a reader by examining magic bytes.
///
/// The reader position is restored before returning.
pub fn detect_format_from_reader<R: Read + Seek>(reader: &mut R) -> Result<Option<ArchiveFormat>> {
    let start_pos = reader.stream_position().map_err(Error::Io)?;

    let mut header = Vec::with_capacity(DETECT_HEADER_LEN);
    reader
        .by_ref()
        .take(DETECT_HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(Error::Io)?;

    reader.seek(SeekFrom::Start(start_pos)).map_err(Error::Io)?;
    Ok(ArchiveFormat::from_signature(&header))
}

/// Detects the archive format of a file on disk.
///
/// Signature detection is tried first; the file extension is used only when
/// no signature matches. A `.cbr` that is really a ZIP file is therefore
/// opened as ZIP.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::UnknownFormat`] if neither method identifies it.
pub fn detect_format(path: impl AsRef<Path>) -> Result<ArchiveFormat> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    if let Some(format) = detect_format_from_reader(&mut file)? {
        return Ok(format);
    }

    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ArchiveFormat::from_extension);

    by_extension.ok_or_else(|| Error::UnknownFormat {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_detect_zip_signature() {
        let data = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert_eq!(
            ArchiveFormat::from_signature(&data),
            Some(ArchiveFormat::Zip)
        );
    }

    #[test]
    fn test_detect_rar_signatures() {
        let rar4 = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x00, 0xCF];
        let rar5 = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07, 0x01, 0x00];
        assert_eq!(ArchiveFormat::from_signature(&rar4), Some(ArchiveFormat::Rar));
        assert_eq!(ArchiveFormat::from_signature(&rar5), Some(ArchiveFormat::Rar));
    }

    #[test]
    fn test_detect_7z_signature() {
        let data = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C, 0x00, 0x04];
        assert_eq!(
            ArchiveFormat::from_signature(&data),
            Some(ArchiveFormat::SevenZip)
        );
    }

    #[test]
    fn test_detect_tar_ustar() {
        let mut data = vec![0u8; 512];
        data[257..262].copy_from_slice(b"ustar");
        assert_eq!(ArchiveFormat::from_signature(&data), Some(ArchiveFormat::Tar));
    }

    #[test]
    fn test_detect_short_input() {
        assert_eq!(ArchiveFormat::from_signature(&[]), None);
        assert_eq!(ArchiveFormat::from_signature(b"PK"), None);
    }

    #[test]
    fn test_detect_from_reader_restores_position() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
        let mut cursor = Cursor::new(data);
        cursor.set_position(4);

        let format = detect_format_from_reader(&mut cursor).unwrap();
        assert_eq!(format, Some(ArchiveFormat::Zip));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(ArchiveFormat::from_extension("cbr"), Some(ArchiveFormat::Rar));
        assert_eq!(ArchiveFormat::from_extension("CBZ"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_extension("7z"), Some(ArchiveFormat::SevenZip));
        assert_eq!(ArchiveFormat::from_extension("cbt"), Some(ArchiveFormat::Tar));
        assert_eq!(ArchiveFormat::from_extension("pdf"), None);
    }

    #[test]
    fn test_detect_from_mime_type() {
        assert_eq!(
            ArchiveFormat::from_mime_type("application/x-cbr"),
            Some(ArchiveFormat::Rar)
        );
        assert_eq!(
            ArchiveFormat::from_mime_type("application/x-7z-compressed"),
            Some(ArchiveFormat::SevenZip)
        );
        assert_eq!(
            ArchiveFormat::from_mime_type("Application/Zip; charset=binary"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::from_mime_type("application/pdf"), None);
    }

    #[test]
    fn test_mime_types_listed_per_format() {
        let cb7: Vec<_> = ArchiveFormat::SevenZip.mime_types().collect();
        assert_eq!(cb7, ["application/x-cb7", "application/x-7z-compressed"]);
    }

    #[test]
    fn test_detect_format_prefers_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.cbr");
        let mut file = File::create(&path).unwrap();
        file.write_all(&[0x50, 0x4B, 0x05, 0x06]).unwrap();
        file.write_all(&[0u8; 18]).unwrap();
        drop(file);

        assert_eq!(detect_format(&path).unwrap(), ArchiveFormat::Zip);
    }

    #[test]
    fn test_detect_format_extension_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.cbt");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(detect_format(&path).unwrap(), ArchiveFormat::Tar);

        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        assert!(matches!(
            detect_format(&path),
            Err(Error::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ArchiveFormat::SevenZip.to_string(), "7-Zip");
        assert_eq!(ArchiveFormat::Zip.comic_extension(), "cbz");
    }
}
