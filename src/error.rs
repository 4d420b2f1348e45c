use std::{io, path::PathBuf};

use font_types::Tag;

/// Result type for WOFF conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a WOFF file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input ended before `what` could be read in full.
    #[error("unexpected end of input while reading {what}")]
    Truncated { what: &'static str },

    /// The header does not start with `wOFF`.
    #[error("bad WOFF signature '{found}'")]
    BadSignature { found: Tag },

    /// A directory entry does not describe a usable table.
    #[error("invalid table directory entry '{tag}': {message}")]
    InvalidDirectory { tag: Tag, message: String },

    /// A compressed table could not be inflated to its declared length.
    #[error("failed to decompress table '{tag}': {message}")]
    DecompressionFailed { tag: Tag, message: String },

    /// Reading from the source or writing to the sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A file-level I/O operation failed.
    #[error("I/O error on '{path}': {source}")]
    File { path: PathBuf, source: io::Error },

    /// The directory scan pattern could not be built.
    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl From<bytes::TryGetError> for Error {
    fn from(_value: bytes::TryGetError) -> Self {
        Self::Truncated { what: "record" }
    }
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_directory(tag: Tag, message: impl Into<String>) -> Self {
        Self::InvalidDirectory {
            tag,
            message: message.into(),
        }
    }

    pub(crate) fn decompression_failed(tag: Tag, message: impl ToString) -> Self {
        Self::DecompressionFailed {
            tag,
            message: message.to_string(),
        }
    }
}

/// Map an I/O failure while reading `what` to `Truncated` if the input simply ran out.
pub(crate) fn read_error(what: &'static str) -> impl FnOnce(io::Error) -> Error {
    move |err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::Truncated { what },
        _ => Error::Io(err),
    }
}

pub(crate) fn u32_will_overflow(a: u32, b: u32) -> bool {
    a.checked_add(b).is_none()
}

#[cfg(not(feature = "debug"))]
mod regular {
    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                return Err($err);
            }
        };
    }
    pub(crate) use bail_if;
}
#[cfg(not(feature = "debug"))]
pub(crate) use regular::*;

#[cfg(feature = "debug")]
mod debug {
    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                panic!("{}: {}", stringify!($cond), $err)
            }
        };
    }
    pub(crate) use bail_if;
}
#[cfg(feature = "debug")]
pub(crate) use debug::*;
