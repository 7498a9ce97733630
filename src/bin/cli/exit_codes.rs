//! Exit codes for the CLI tool.

use cbarchive::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive is damaged or holds no pages
pub const BAD_ARCHIVE: i32 = 3;
/// Archive pages are encrypted
pub const ENCRYPTED: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    Encrypted,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::Encrypted => ENCRYPTED,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a cbarchive error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::ArchiveEncrypted => ExitCode::Encrypted,
        Error::Open { .. }
        | Error::Stream(_)
        | Error::Decompress(_)
        | Error::FileCorrupted
        | Error::NoFiles
        | Error::NoSupportedImages
        | Error::UnknownFormat { .. }
        | Error::PageNotFound { .. }
        | Error::Image(_) => ExitCode::BadArchive,
        Error::PageOutOfRange { .. } => ExitCode::BadArgs,
        Error::UnsupportedFormat { .. } | Error::NotOpen => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
