//! TAR (`.cbt`) backend.
//!
//! Headers are parsed by [`tar::Archive::entries_with_seek`], which handles
//! checksums, GNU long names and PAX records. `Entries` borrows its reader,
//! so the cursor keeps only the file and the offset of the next header: each
//! `next_header` seeks there and opens a fresh iterator for one step. Entry
//! data is then streamed straight off the file.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::{EntryCursor, EntryHeader, EntryName, open_error};
use crate::config::ReaderConfig;
use crate::{Error, Result};

const BLOCK_SIZE: u64 = 512;

pub(crate) struct TarCursor {
    reader: BufReader<File>,
    /// Absolute offset of the next header block.
    next_offset: u64,
    /// Unread data bytes of the current entry.
    remaining: u64,
    finished: bool,
}

impl TarCursor {
    pub(crate) fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;
        let mut reader = BufReader::with_capacity(config.read_buffer_size, file);

        // Parse the first member up front so a non-TAR file fails at open.
        {
            let mut archive = tar::Archive::new(&mut reader);
            let mut entries = archive.entries_with_seek().map_err(|e| open_error(path, e))?;
            if let Some(Err(e)) = entries.next() {
                return Err(open_error(path, e));
            }
        }
        reader.rewind().map_err(|e| open_error(path, e))?;

        Ok(Self {
            reader,
            next_offset: 0,
            remaining: 0,
            finished: false,
        })
    }

    fn advance(&mut self) -> io::Result<Option<EntryHeader>> {
        let base = self.next_offset;
        self.reader.seek(SeekFrom::Start(base))?;
        self.remaining = 0;

        let found = {
            let mut archive = tar::Archive::new(&mut self.reader);
            let mut found = None;
            for entry in archive.entries_with_seek()? {
                let entry = entry?;
                let kind = entry.header().entry_type();
                if !(kind.is_file() || kind.is_contiguous()) {
                    log::debug!(
                        "Skipping '{}' as it's not a regular file",
                        String::from_utf8_lossy(&entry.path_bytes())
                    );
                    continue;
                }
                found = Some((
                    entry.path_bytes().into_owned(),
                    entry.size(),
                    entry.raw_file_position(),
                ));
                break;
            }
            found
        };

        let Some((name, size, data_offset)) = found else {
            return Ok(None);
        };

        let data_start = base.checked_add(data_offset).ok_or_else(size_overflow)?;
        self.next_offset = size
            .checked_next_multiple_of(BLOCK_SIZE)
            .and_then(|padded| data_start.checked_add(padded))
            .ok_or_else(size_overflow)?;
        self.reader.seek(SeekFrom::Start(data_start))?;
        self.remaining = size;

        Ok(Some(EntryHeader {
            name: EntryName::new(name),
            size,
            encrypted: false,
        }))
    }
}

impl EntryCursor for TarCursor {
    fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        if self.finished {
            return Ok(None);
        }

        match self.advance() {
            Ok(Some(header)) => Ok(Some(header)),
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                self.remaining = 0;
                Err(Error::Stream(e.to_string()))
            }
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let want = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        let read = self
            .reader
            .read(&mut buf[..want])
            .map_err(|e| Error::Decompress(e.to_string()))?;
        if read == 0 {
            self.remaining = 0;
            self.finished = true;
            return Err(Error::Decompress(
                "archive truncated inside entry data".to_string(),
            ));
        }

        self.remaining -= read as u64;
        Ok(read)
    }
}

fn size_overflow() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "entry size overflows the archive")
}
