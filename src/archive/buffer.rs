//! In-memory staging for entry data.
//!
//! Backends whose decoders cannot be held across calls decode the current
//! entry in one go on the first `read_data` and serve later reads from here.

use std::io::{self, Cursor, Read};

/// Decoded bytes of the current entry, if materialised.
#[derive(Debug, Default)]
pub(crate) struct EntryBuffer {
    data: Option<Cursor<Vec<u8>>>,
}

impl EntryBuffer {
    pub(crate) fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn load(&mut self, bytes: Vec<u8>) {
        self.data = Some(Cursor::new(bytes));
    }

    pub(crate) fn clear(&mut self) {
        self.data = None;
    }

    /// Copies the next unread bytes into `buf`; 0 once drained or unloaded.
    pub(crate) fn read(&mut self, buf: &mut [u8]) -> usize {
        match self.data.as_mut() {
            // Reading from an in-memory cursor cannot fail.
            Some(cursor) => cursor.read(buf).unwrap_or(0),
            None => 0,
        }
    }
}

/// Reads `reader` to the end, refusing to grow past `limit` bytes.
pub(crate) fn read_bounded<R: Read>(reader: R, size_hint: u64, limit: u64) -> io::Result<Vec<u8>> {
    let capacity = size_hint.min(limit).min(usize::MAX as u64) as usize;
    let mut bytes = Vec::with_capacity(capacity);
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;

    if bytes.len() as u64 > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("entry exceeds the {} byte limit", limit),
        ));
    }
    Ok(bytes)
}
