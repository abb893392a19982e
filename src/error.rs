use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while summarizing a single NIfTI volume or writing
/// the resulting table.
#[derive(Debug, Error)]
pub enum NiftiInfoError {
    /// The input path does not exist
    #[error("No such file: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The path exists but could not be opened or read. This covers both the
    /// volume itself and its sidecar.
    #[error("Could not read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The `sizeof_hdr` field matched no known header size in either byte order
    #[error("Not a NIfTI header: sizeof_hdr bytes {bytes:02x?} match no known header size in either byte order")]
    InvalidHeader { bytes: [u8; 4] },

    /// The stream ended before the fixed-size header was complete
    #[error("Truncated NIfTI header: expected {expected} bytes but only {found} were available")]
    TruncatedHeader { expected: usize, found: usize },

    /// The sidecar exists but does not hold a JSON object
    #[error("Failed to parse sidecar {}: {source}", .path.display())]
    SidecarParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the summary table failed
    #[error("Failed to write output: {0}")]
    Output(
        #[from]
        #[source]
        csv::Error,
    ),
}

pub type Result<T> = std::result::Result<T, NiftiInfoError>;

impl NiftiInfoError {
    /// Classify an [`io::Error`] raised while opening or reading `path`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Unreadable { path, source },
        }
    }

    /// Attach `path` to an [`NiftiInfoError::Unreadable`] raised by a reader
    /// that did not know which file it was reading.
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Unreadable { path: p, source } if p.as_os_str().is_empty() => Self::Unreadable {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}

impl From<NiftiInfoError> for io::Error {
    fn from(value: NiftiInfoError) -> Self {
        let s = value.to_string();
        match value {
            NiftiInfoError::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, s),
            NiftiInfoError::Unreadable { source, .. } => source,
            NiftiInfoError::InvalidHeader { .. } | NiftiInfoError::SidecarParse { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, s)
            }
            NiftiInfoError::TruncatedHeader { .. } => {
                io::Error::new(io::ErrorKind::UnexpectedEof, s)
            }
            NiftiInfoError::Output(e) => e.into(),
        }
    }
}
