//! ZIP (`.cbz`) backend.
//!
//! Entries are walked in central-directory order. The `zip` crate hands out
//! entry readers that borrow the archive, so the current entry is decoded
//! into memory on the first read.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use zip::ZipArchive;

use super::buffer::{EntryBuffer, read_bounded};
use super::{EntryCursor, EntryHeader, EntryName, open_error};
use crate::config::ReaderConfig;
use crate::{Error, Result};

pub(crate) struct ZipCursor {
    archive: ZipArchive<BufReader<File>>,
    next_index: usize,
    current: Option<(usize, u64)>,
    data: EntryBuffer,
    max_entry_size: u64,
}

impl ZipCursor {
    pub(crate) fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let reader = BufReader::with_capacity(config.read_buffer_size, file);
        let archive = ZipArchive::new(reader).map_err(|e| open_error(path, e))?;

        Ok(Self {
            archive,
            next_index: 0,
            current: None,
            data: EntryBuffer::default(),
            max_entry_size: config.max_entry_size,
        })
    }

    fn load_current(&mut self) -> Result<()> {
        let Some((index, size)) = self.current else {
            return Ok(());
        };

        let file = self
            .archive
            .by_index(index)
            .map_err(|e| Error::Decompress(e.to_string()))?;
        let bytes = read_bounded(file, size, self.max_entry_size)
            .map_err(|e| Error::Decompress(e.to_string()))?;
        self.data.load(bytes);
        Ok(())
    }
}

impl EntryCursor for ZipCursor {
    fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        self.current = None;
        self.data.clear();

        while self.next_index < self.archive.len() {
            let index = self.next_index;
            self.next_index += 1;

            // Raw access reads metadata without asking for a password.
            let file = self
                .archive
                .by_index_raw(index)
                .map_err(|e| Error::Stream(e.to_string()))?;

            if !file.is_file() {
                log::debug!("Skipping '{}' as it's not a regular file", file.name());
                continue;
            }

            let header = EntryHeader {
                name: EntryName::from(file.name()),
                size: file.size(),
                encrypted: file.encrypted(),
            };
            self.current = Some((index, header.size));
            return Ok(Some(header));
        }

        Ok(None)
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.data.is_loaded() {
            self.load_current()?;
        }
        Ok(self.data.read(buf))
    }
}
