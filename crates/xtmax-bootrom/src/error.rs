use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootRomError>;

/// Errors produced while patching a ROM image or generating its header.
///
/// Every failure is fatal for the build step. None of these are retried.
#[derive(Debug, Error)]
pub enum BootRomError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM image is empty")]
    EmptyImage,

    #[error("no `%define ROM_SEGMENT` directive found in {}", path.display())]
    MissingSegmentDirective { path: PathBuf },

    #[error("malformed ROM_SEGMENT directive on line {line}: {text:?} is not a hexadecimal segment")]
    MalformedSegment { line: usize, text: String },

    #[error(
        "{}:{line}: malformed ROM_SEGMENT directive: {text:?} is not a hexadecimal segment",
        path.display()
    )]
    MalformedSegmentIn {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("{} does not exist", path.display())]
    HeaderMissing { path: PathBuf },

    #[error("{} does not match the generated header", path.display())]
    HeaderOutOfDate { path: PathBuf },
}

impl BootRomError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
