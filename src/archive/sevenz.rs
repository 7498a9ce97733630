//! 7z (`.cb7`) backend.
//!
//! Headers come from the archive's file table. Entry data lives in folders
//! (solid blocks); reading an entry decodes its folder from the start up to
//! that entry and keeps the entry's bytes in memory.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use sevenz_rust::{Archive, BlockDecoder, SevenZMethod};

use super::buffer::{EntryBuffer, read_bounded};
use super::{EntryCursor, EntryHeader, EntryName, open_error};
use crate::config::ReaderConfig;
use crate::{Error, Result};

pub(crate) struct SevenZipCursor {
    archive: Archive,
    source: BufReader<File>,
    next_index: usize,
    current: Option<usize>,
    data: EntryBuffer,
    max_entry_size: u64,
}

impl SevenZipCursor {
    pub(crate) fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let len = file.metadata().map_err(|e| open_error(path, e))?.len();
        let mut source = BufReader::with_capacity(config.read_buffer_size, file);
        let archive = Archive::read(&mut source, len, &[]).map_err(|e| open_error(path, e))?;

        Ok(Self {
            archive,
            source,
            next_index: 0,
            current: None,
            data: EntryBuffer::default(),
            max_entry_size: config.max_entry_size,
        })
    }

    /// Whether the folder holding file `index` is AES-encrypted.
    fn is_encrypted(&self, index: usize) -> bool {
        let folder = self
            .archive
            .stream_map
            .file_folder_index
            .get(index)
            .copied()
            .flatten()
            .and_then(|folder| self.archive.folders.get(folder));

        folder.is_some_and(|folder| {
            folder
                .coders
                .iter()
                .any(|coder| coder.decompression_method_id() == SevenZMethod::ID_AES256SHA256)
        })
    }

    fn load_current(&mut self) -> Result<()> {
        let Some(index) = self.current else {
            return Ok(());
        };

        let folder = self
            .archive
            .stream_map
            .file_folder_index
            .get(index)
            .copied()
            .flatten();
        let Some(folder) = folder else {
            // Empty files have no stream.
            self.data.load(Vec::new());
            return Ok(());
        };

        let first_file = self.archive.stream_map.folder_first_file_index[folder];
        let target = index - first_file;
        let size = self.archive.files[index].size;
        let limit = self.max_entry_size;

        let mut position = 0;
        let mut bytes = None;
        let decoder = BlockDecoder::new(folder, &self.archive, &[], &mut self.source);
        decoder
            .for_each_entries(&mut |_entry, reader| {
                if position == target {
                    bytes = Some(read_bounded(reader, size, limit)?);
                    return Ok(false);
                }
                // Earlier entries share the folder stream and must be consumed.
                io::copy(reader, &mut io::sink())?;
                position += 1;
                Ok(true)
            })
            .map_err(|e| Error::Decompress(e.to_string()))?;

        match bytes {
            Some(bytes) => {
                self.data.load(bytes);
                Ok(())
            }
            None => Err(Error::Decompress(format!(
                "entry {} missing from its folder",
                index
            ))),
        }
    }
}

impl EntryCursor for SevenZipCursor {
    fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        self.current = None;
        self.data.clear();

        while self.next_index < self.archive.files.len() {
            let index = self.next_index;
            self.next_index += 1;

            let entry = &self.archive.files[index];
            if entry.is_directory || entry.is_anti_item {
                log::debug!("Skipping '{}' as it's not a regular file", entry.name);
                continue;
            }

            let header = EntryHeader {
                name: EntryName::from(entry.name.as_str()),
                size: entry.size,
                encrypted: self.is_encrypted(index),
            };
            self.current = Some(index);
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
