//! RAR (`.cbr`) backend, covering legacy RAR and RAR5.
//!
//! `unrar` models its cursor as a typestate: an archive positioned before a
//! header, or before a file's data. The state is held here between calls.
//! The library extracts whole files, so entry data is kept in memory.

use std::path::Path;

use unrar::{Archive, CursorBeforeFile, CursorBeforeHeader, OpenArchive, Process};

use super::buffer::EntryBuffer;
use super::{EntryCursor, EntryHeader, EntryName, open_error};
use crate::config::ReaderConfig;
use crate::{Error, Result};

enum RarState {
    BeforeHeader(OpenArchive<Process, CursorBeforeHeader>),
    BeforeFile(OpenArchive<Process, CursorBeforeFile>),
    Finished,
}

pub(crate) struct RarCursor {
    state: RarState,
    data: EntryBuffer,
    max_entry_size: u64,
}

impl RarCursor {
    pub(crate) fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        let archive = Archive::new(path)
            .open_for_processing()
            .map_err(|e| open_error(path, e))?;

        Ok(Self {
            state: RarState::BeforeHeader(archive),
            data: EntryBuffer::default(),
            max_entry_size: config.max_entry_size,
        })
    }
}

impl EntryCursor for RarCursor {
    fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        self.data.clear();

        // Any failure below leaves the cursor finished.
        let mut archive = match std::mem::replace(&mut self.state, RarState::Finished) {
            RarState::BeforeHeader(archive) => archive,
            RarState::BeforeFile(file) => file.skip().map_err(|e| Error::Stream(e.to_string()))?,
            RarState::Finished => return Ok(None),
        };

        loop {
            let Some(file) = archive
                .read_header()
                .map_err(|e| Error::Stream(e.to_string()))?
            else {
                return Ok(None);
            };

            let entry = file.entry();
            if !entry.is_file() {
                log::debug!(
                    "Skipping '{}' as it's not a regular file",
                    entry.filename.display()
                );
                archive = file.skip().map_err(|e| Error::Stream(e.to_string()))?;
                continue;
            }

            let header = EntryHeader {
                name: EntryName::from(entry.filename.to_string_lossy().into_owned()),
                size: entry.unpacked_size as u64,
                encrypted: entry.is_encrypted(),
            };
            self.state = RarState::BeforeFile(file);
            return Ok(Some(header));
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.data.is_loaded() {
            if let RarState::BeforeFile(file) = &self.state {
                let size = file.entry().unpacked_size as u64;
                if size > self.max_entry_size {
                    return Err(Error::Decompress(format!(
                        "entry exceeds the {} byte limit",
                        self.max_entry_size
                    )));
                }
            }

            match std::mem::replace(&mut self.state, RarState::Finished) {
                RarState::BeforeFile(file) => {
                    let (bytes, archive) =
                        file.read().map_err(|e| Error::Decompress(e.to_string()))?;
                    self.state = RarState::BeforeHeader(archive);
                    self.data.load(bytes);
                }
                other => self.state = other,
            }
        }
        Ok(self.data.read(buf))
    }
}
