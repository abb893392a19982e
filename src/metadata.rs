use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{NiftiInfoError, Result};
use crate::header::NiftiHeader;
use crate::io::HeaderSource;
use crate::sidecar::Sidecar;

/// A one-line description of a volume, combining its header with its sidecar.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub protocol_name: Option<String>,
    pub series_description: Option<String>,
    /// `dim[1..=4]`
    pub shape: [i64; 4],
    /// `pixdim[1..=4]`
    pub pixdims: [f64; 4],
    pub image_type: Option<Vec<String>>,
    /// `shape[3] * pixdims[3]`, only a duration if the fourth axis is time
    pub seconds: f64,
    /// Canonical absolute path of the volume
    pub filename: PathBuf,
}

impl ImageMetadata {
    /// The column names, in output order
    pub const FIELDS: [&'static str; 7] = [
        "protocol_name",
        "series_description",
        "shape",
        "pixdims",
        "image_type",
        "seconds",
        "filename",
    ];

    /// Open, decode and describe the volume at `path`.
    ///
    /// The file handle is released before this returns, whether or not
    /// decoding succeeded.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let header = {
            let mut source = HeaderSource::open(path)?;
            NiftiHeader::decode(&mut source).map_err(|e| e.at_path(path))?
        };
        Self::assemble(path, &header)
    }

    /// Combine an already decoded header with the sidecar found next to `path`.
    pub fn assemble<P: AsRef<Path>>(path: P, header: &NiftiHeader) -> Result<Self> {
        let path = path.as_ref();
        let sidecar = Sidecar::load_for(path)?;
        Self::from_parts(path, header, &sidecar)
    }

    /// Combine a decoded header and a sidecar record. Only the filename
    /// resolution touches the file system.
    pub fn from_parts(path: &Path, header: &NiftiHeader, sidecar: &Sidecar) -> Result<Self> {
        let filename = fs::canonicalize(path).map_err(|e| NiftiInfoError::from_io(path, e))?;
        debug!("Assembling metadata for {}", filename.display());
        Ok(Self {
            protocol_name: sidecar.protocol_name().map(str::to_string),
            series_description: sidecar.series_description().map(str::to_string),
            shape: header.shape(),
            pixdims: header.pixdims(),
            image_type: sidecar.image_type(),
            seconds: header.seconds(),
            filename,
        })
    }
}
