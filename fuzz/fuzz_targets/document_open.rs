//! Fuzz target for opening a comic book from arbitrary bytes.
//!
//! The bytes are written to a temporary file and opened once per compiled-in
//! container format, so every backend's header parsing sees the same input.
//! When a catalog is built, every page is fetched in reverse order to drive
//! the restart path of the page accessor.
//!
//! Run with: cargo +nightly fuzz run document_open

#![no_main]

use std::io::Write;

use cbarchive::{ArchiveFormat, ComicDocument, ImageSupport, ReaderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut file) = tempfile::NamedTempFile::new() else {
        return;
    };
    if file.write_all(data).is_err() {
        return;
    }

    let config = ReaderConfig::low_memory().max_entry_size(1 << 20);
    for format in ArchiveFormat::ALL {
        if !format.is_supported() {
            continue;
        }

        // We don't care about the result - we're looking for panics or hangs
        let Ok(mut document) =
            ComicDocument::open_with(file.path(), format, ImageSupport::global(), config.clone())
        else {
            continue;
        };

        for index in (0..document.page_count()).rev() {
            let _ = document.page_data(index);
        }
    }
});
