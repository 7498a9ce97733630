//! Shared test utilities for integration tests.
//!
//! This module builds real comic book archives on disk with the container
//! crates' own writers, plus small page images to put in them.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// An entry to place in a test archive.
#[derive(Clone, Copy)]
pub enum Item<'a> {
    /// Regular file with content.
    File(&'a str, &'a [u8]),
    /// Directory entry.
    Dir(&'a str),
    /// Symbolic link (TAR only).
    Link(&'a str, &'a str),
}

/// Encodes a `width` x `height` PNG with a gradient, so it does not compress
/// down to a handful of bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 5) as u8, (y * 11) as u8, (x ^ y) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(pixels)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

/// Writes a ZIP archive at `dir/name`.
pub fn create_zip(dir: &Path, name: &str, items: &[Item<'_>]) -> PathBuf {
    use zip::write::SimpleFileOptions;

    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create zip file");
    let mut writer = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for item in items {
        match *item {
            Item::File(name, data) => {
                writer.start_file(name, options).expect("start_file");
                writer.write_all(data).expect("write zip entry");
            }
            Item::Dir(name) => {
                writer.add_directory(name, options).expect("add_directory");
            }
            Item::Link(..) => panic!("links are not used in zip fixtures"),
        }
    }

    writer.finish().expect("Failed to finish zip");
    path
}

/// Sets the "encrypted" general-purpose flag on the named ZIP entries.
///
/// The data itself stays in the clear; readers must refuse based on the flag.
pub fn mark_zip_entries_encrypted(path: &Path, names: &[&str]) {
    let mut bytes = std::fs::read(path).expect("read zip");

    let eocd = bytes
        .windows(4)
        .rposition(|w| w == [0x50, 0x4B, 0x05, 0x06])
        .expect("end of central directory");
    let count = u16::from_le_bytes([bytes[eocd + 10], bytes[eocd + 11]]) as usize;
    let mut offset = u32::from_le_bytes(bytes[eocd + 16..eocd + 20].try_into().unwrap()) as usize;

    for _ in 0..count {
        assert_eq!(&bytes[offset..offset + 4], &[0x50, 0x4B, 0x01, 0x02]);
        let name_len = u16::from_le_bytes([bytes[offset + 28], bytes[offset + 29]]) as usize;
        let extra_len = u16::from_le_bytes([bytes[offset + 30], bytes[offset + 31]]) as usize;
        let comment_len = u16::from_le_bytes([bytes[offset + 32], bytes[offset + 33]]) as usize;
        let local = u32::from_le_bytes(bytes[offset + 42..offset + 46].try_into().unwrap()) as usize;
        let name = &bytes[offset + 46..offset + 46 + name_len];

        if names.iter().any(|n| n.as_bytes() == name) {
            bytes[offset + 8] |= 0x01;
            assert_eq!(&bytes[local..local + 4], &[0x50, 0x4B, 0x03, 0x04]);
            bytes[local + 6] |= 0x01;
        }

        offset += 46 + name_len + extra_len + comment_len;
    }

    std::fs::write(path, bytes).expect("write zip");
}

/// Writes a TAR archive at `dir/name`.
pub fn create_tar(dir: &Path, name: &str, items: &[Item<'_>]) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create tar file");
    let mut builder = tar::Builder::new(file);

    for item in items {
        let mut header = tar::Header::new_gnu();
        header.set_mode(0o644);
        match *item {
            Item::File(name, data) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(data.len() as u64);
                builder
                    .append_data(&mut header, name, data)
                    .expect("append file");
            }
            Item::Dir(name) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
                builder
                    .append_data(&mut header, name, std::io::empty())
                    .expect("append dir");
            }
            Item::Link(name, target) => {
                header.set_entry_type(tar::EntryType::Symlink);
                header.set_size(0);
                builder
                    .append_link(&mut header, name, target)
                    .expect("append link");
            }
        }
    }

    builder.into_inner().expect("Failed to finish tar");
    path
}

/// Formats one PAX extended header record (`"<len> <key>=<value>\n"`).
fn pax_record(key: &str, value: &str) -> Vec<u8> {
    let body = format!(" {}={}\n", key, value);
    let mut len = body.len();
    loop {
        let total = len.to_string().len() + body.len();
        if total == len {
            break;
        }
        len = total;
    }
    format!("{}{}", len, body).into_bytes()
}

/// Writes a TAR archive with `first` as a normal file, then an empty
/// `second` whose size is overridden by a PAX `size` record.
pub fn create_tar_with_pax_size(
    dir: &Path,
    name: &str,
    first: (&str, &[u8]),
    second: &str,
    pax_size: &str,
) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).expect("Failed to create tar file");
    let mut builder = tar::Builder::new(file);

    let mut header = tar::Header::new_ustar();
    header.set_mode(0o644);
    header.set_size(first.1.len() as u64);
    builder
        .append_data(&mut header, first.0, first.1)
        .expect("append file");

    let record = pax_record("size", pax_size);
    let mut pax = tar::Header::new_ustar();
    pax.set_mode(0o644);
    pax.set_entry_type(tar::EntryType::XHeader);
    pax.set_size(record.len() as u64);
    builder
        .append_data(&mut pax, "PaxHeaders/next", record.as_slice())
        .expect("append pax header");

    let mut header = tar::Header::new_ustar();
    header.set_mode(0o644);
    header.set_size(0);
    builder
        .append_data(&mut header, second, std::io::empty())
        .expect("append file");

    builder.into_inner().expect("Failed to finish tar");
    path
}

fn sevenz_entry(name: &str, is_directory: bool) -> sevenz_rust::SevenZArchiveEntry {
    let mut entry = sevenz_rust::SevenZArchiveEntry::new();
    entry.name = name.to_string();
    entry.is_directory = is_directory;
    entry.has_stream = !is_directory;
    entry
}

/// Writes a 7z archive at `dir/name`, one folder per file.
pub fn create_7z(dir: &Path, name: &str, items: &[Item<'_>]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = sevenz_rust::SevenZWriter::create(&path).expect("Failed to create 7z");

    for item in items {
        match *item {
            Item::File(name, data) => {
                writer
                    .push_archive_entry(sevenz_entry(name, false), Some(data))
                    .expect("push file");
            }
            Item::Dir(name) => {
                writer
                    .push_archive_entry::<&[u8]>(sevenz_entry(name, true), None)
                    .expect("push dir");
            }
            Item::Link(..) => panic!("links are not used in 7z fixtures"),
        }
    }

    writer.finish().expect("Failed to finish 7z");
    path
}

/// Writes a solid 7z archive at `dir/name`: every file shares one folder.
pub fn create_solid_7z(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    use sevenz_rust::{SeqReader, SourceReader};

    let path = dir.join(name);
    let mut writer = sevenz_rust::SevenZWriter::create(&path).expect("Failed to create 7z");

    let entries = files
        .iter()
        .map(|(name, _)| sevenz_entry(name, false))
        .collect();
    let readers = files
        .iter()
        .map(|(_, data)| SourceReader::new(*data))
        .collect();

    writer
        .push_archive_entries(entries, SeqReader::new(readers))
        .expect("push solid block");
    writer.finish().expect("Failed to finish 7z");
    path
}
