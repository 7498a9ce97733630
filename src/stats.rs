//! Cursor statistics for archive handles.
//!
//! Counting opens and resets makes the cost of random page access visible:
//! every backward jump re-decodes the archive from its first entry.

/// Aggregated cursor statistics for one [`ArchiveHandle`](crate::ArchiveHandle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorStats {
    /// Number of successful `open` calls.
    pub opens: u64,
    /// Number of successful `reset` calls.
    pub resets: u64,
    /// Regular-file headers the cursor stopped at.
    pub headers_read: u64,
    /// Entry bytes returned by `read_data`.
    pub bytes_read: u64,
}

impl CursorStats {
    /// Returns the number of times the archive was decoded from the start.
    pub fn passes(&self) -> u64 {
        self.opens + self.resets
    }

    pub(crate) fn record_open(&mut self) {
        self.opens += 1;
    }

    pub(crate) fn record_reset(&mut self) {
        self.resets += 1;
    }

    pub(crate) fn record_header(&mut self) {
        self.headers_read += 1;
    }

    pub(crate) fn record_read(&mut self, bytes: usize) {
        self.bytes_read += bytes as u64;
    }
}

impl std::fmt::Display for CursorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} opens, {} resets, {} headers, {} bytes",
            self.opens, self.resets, self.headers_read, self.bytes_read
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_passes() {
        let mut stats = CursorStats::default();
        stats.record_open();
        stats.record_reset();
        stats.record_reset();
        assert_eq!(stats.passes(), 3);
    }

    #[test]
    fn test_stats_display() {
        let mut stats = CursorStats::default();
        stats.record_open();
        stats.record_header();
        stats.record_read(4096);
        assert_eq!(stats.to_string(), "1 opens, 0 resets, 1 headers, 4096 bytes");
    }
}
