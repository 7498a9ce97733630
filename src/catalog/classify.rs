//! Image extension classification.
//!
//! A catalog keeps an entry only if its extension names an image type some
//! installed decoder can read. Entries with an extension that is a known
//! image type but lacks a decoder are remembered so the failure reason can
//! say "no supported images" instead of "no files".

use std::collections::HashSet;
use std::sync::LazyLock;

use image::ImageFormat;

/// Classification of a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionClass {
    /// Not an image type; the entry is ignored.
    Unknown,
    /// An image type no decoder is available for.
    Unsupported,
    /// An image type that can be decoded.
    Supported,
}

/// Image types recognised regardless of decoder availability.
const KNOWN_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "jpe", "jfif", "png", "gif", "webp", "bmp", "dib", "tif", "tiff", "avif",
    "heic", "heif", "jxl", "jp2", "j2k", "ico", "tga", "pnm", "pbm", "pgm", "ppm", "qoi",
    "exr", "hdr", "dds", "ff", "farbfeld", "pcx", "psd", "svg", "xpm", "xbm",
];

static GLOBAL: LazyLock<ImageSupport> = LazyLock::new(ImageSupport::from_image_codecs);

/// Lookup table from lowercase extension to [`ExtensionClass`].
#[derive(Debug, Clone, Default)]
pub struct ImageSupport {
    supported: HashSet<String>,
    known: HashSet<String>,
}

impl ImageSupport {
    /// Returns the process-wide table built from the `image` crate's decoders.
    ///
    /// Built on first use and never modified afterwards.
    pub fn global() -> &'static ImageSupport {
        &GLOBAL
    }

    /// Builds a table from the decoders enabled in the `image` crate.
    pub fn from_image_codecs() -> Self {
        let supported = ImageFormat::all()
            .filter(|format| format.reading_enabled())
            .flat_map(|format| format.extensions_str().iter().copied());

        let table = Self::from_lists(supported, KNOWN_IMAGE_EXTENSIONS.iter().copied());
        log::debug!(
            "Image decoders available for: {}",
            table.supported_extensions().join(", ")
        );
        table
    }

    /// Builds a table from explicit extension lists.
    ///
    /// Extensions are matched case-insensitively. Every supported extension
    /// is also known.
    pub fn from_lists<S, K>(supported: S, known: K) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let supported: HashSet<String> = supported
            .into_iter()
            .map(|ext| ext.as_ref().to_lowercase())
            .collect();
        let mut known: HashSet<String> = known
            .into_iter()
            .map(|ext| ext.as_ref().to_lowercase())
            .collect();
        known.extend(supported.iter().cloned());

        Self { supported, known }
    }

    /// Classifies a lowercase extension (without the leading dot).
    pub fn classify(&self, extension: &str) -> ExtensionClass {
        if self.supported.contains(extension) {
            ExtensionClass::Supported
        } else if self.known.contains(extension) {
            ExtensionClass::Unsupported
        } else {
            ExtensionClass::Unknown
        }
    }

    /// Returns the supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.supported.iter().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}
