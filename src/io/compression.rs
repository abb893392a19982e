use std::fs;
use std::io::{self, prelude::*, BufReader};
use std::path;

use flate2::bufread::MultiGzDecoder;
use log::debug;

use crate::error::{NiftiInfoError, Result};
use crate::io::infer_from_path;

pub fn is_gzipped(header: &[u8]) -> bool {
    header.starts_with(b"\x1f\x8b")
}

/// Strip a trailing `.gz` from `path`, reporting whether one was present
pub fn is_gzipped_extension(path: path::PathBuf) -> (bool, path::PathBuf) {
    if let Some(ext) = path.extension() {
        if ext.to_ascii_lowercase() == "gz" {
            (true, path.with_extension(""))
        } else {
            (false, path)
        }
    } else {
        (false, path)
    }
}

/// A byte stream over the logical (decompressed) contents of a volume file,
/// positioned at the first byte of the header.
///
/// The stream owns the file handle, which is closed when the stream is dropped.
pub enum HeaderSource {
    Plain(BufReader<fs::File>),
    Gzip(MultiGzDecoder<BufReader<fs::File>>),
}

impl HeaderSource {
    /// Open `path` for header decoding, transparently decompressing it if the
    /// leading bytes carry the gzip magic number.
    ///
    /// The file name plays no part in this decision, so a mislabeled
    /// `.nii.gz` still opens.
    pub fn open<P: AsRef<path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let handle = fs::File::open(path).map_err(|e| NiftiInfoError::from_io(path, e))?;
        let is_dir = handle
            .metadata()
            .map_err(|e| NiftiInfoError::from_io(path, e))?
            .is_dir();
        if is_dir {
            return Err(NiftiInfoError::Unreadable {
                path: path.into(),
                source: io::Error::new(io::ErrorKind::Other, "is a directory"),
            });
        }

        let mut stream = BufReader::new(handle);
        let compressed = is_gzipped(stream.fill_buf().map_err(|e| NiftiInfoError::from_io(path, e))?);
        let (format, named_gzip) = infer_from_path(path);
        debug!(
            "Opening {} ({format}) as {} stream",
            path.display(),
            if compressed { "a gzip" } else { "an uncompressed" }
        );
        if named_gzip != compressed {
            debug!(
                "{} is named as {}compressed but its contents are not",
                path.display(),
                if named_gzip { "" } else { "un" }
            );
        }
        if compressed {
            Ok(Self::Gzip(MultiGzDecoder::new(stream)))
        } else {
            Ok(Self::Plain(stream))
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }
}

impl Read for HeaderSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Gzip(stream) => stream.read(buf),
        }
    }
}
