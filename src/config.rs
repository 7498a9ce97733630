//! Configuration for archive cursors and page fetches.
//!
//! This module provides [`ReaderConfig`] for controlling buffer sizes and
//! the limits applied while scanning and reading an archive.

/// Configuration for reading comic book archives.
///
/// # Example
///
/// ```rust
/// use cbarchive::ReaderConfig;
///
/// // Default configuration (64 KiB read buffer, 1 KiB probe blocks)
/// let config = ReaderConfig::default();
///
/// // Custom configuration for very large scans
/// let config = ReaderConfig::new()
///     .read_buffer_size(256 * 1024)
///     .max_entry_size(512 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Buffer size used when opening the archive file (bytes).
    ///
    /// Default: 64 KiB.
    pub read_buffer_size: usize,

    /// Chunk size handed to the image decoder while probing page dimensions.
    ///
    /// Small chunks let the probe stop as soon as the image header has been
    /// seen. Default: 1 KiB.
    pub probe_block_size: usize,

    /// Largest entry a full page read will materialise (bytes).
    ///
    /// Entries declaring a larger size fail with
    /// [`Error::Decompress`](crate::Error::Decompress).
    /// Default: 256 MiB.
    pub max_entry_size: u64,

    /// Basename prefix of entries that are metadata rather than pages.
    ///
    /// macOS writes `._name` resource-fork companions next to every file it
    /// archives. Default: `"._"`.
    pub resource_fork_prefix: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 64 * 1024,       // 64 KiB
            probe_block_size: 1024,            // 1 KiB
            max_entry_size: 256 * 1024 * 1024, // 256 MiB
            resource_fork_prefix: "._".to_string(),
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration optimized for low memory usage.
    pub fn low_memory() -> Self {
        Self {
            read_buffer_size: 16 * 1024,      // 16 KiB
            probe_block_size: 512,
            max_entry_size: 64 * 1024 * 1024, // 64 MiB
            resource_fork_prefix: "._".to_string(),
        }
    }

    /// Sets the file buffer size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(512);
        self
    }

    /// Sets the size-probe chunk size.
    pub fn probe_block_size(mut self, size: usize) -> Self {
        self.probe_block_size = size.max(1);
        self
    }

    /// Sets the largest entry a full page read will materialise.
    pub fn max_entry_size(mut self, size: u64) -> Self {
        self.max_entry_size = size;
        self
    }

    /// Sets the resource-fork basename prefix. An empty prefix disables the filter.
    pub fn resource_fork_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_fork_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.read_buffer_size, 64 * 1024);
        assert_eq!(config.probe_block_size, 1024);
        assert_eq!(config.max_entry_size, 256 * 1024 * 1024);
        assert_eq!(config.resource_fork_prefix, "._");
    }

    #[test]
    fn test_low_memory_config() {
        let config = ReaderConfig::low_memory();
        assert!(config.read_buffer_size < ReaderConfig::default().read_buffer_size);
        assert!(config.max_entry_size < ReaderConfig::default().max_entry_size);
    }

    #[test]
    fn test_builder_clamps_sizes() {
        let config = ReaderConfig::new()
            .read_buffer_size(0)
            .probe_block_size(0)
            .resource_fork_prefix("");
        assert_eq!(config.read_buffer_size, 512);
        assert_eq!(config.probe_block_size, 1);
        assert!(config.resource_fork_prefix.is_empty());
    }
}
