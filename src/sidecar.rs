//! JSON sidecars written next to a volume by the DICOM converter.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::error::{NiftiInfoError, Result};
use crate::io::volume_stem;

/// The sidecar keys this crate reads. Everything else in the file is ignored.
pub const PROTOCOL_NAME: &str = "ProtocolName";
pub const SERIES_DESCRIPTION: &str = "SeriesDescription";
pub const IMAGE_TYPE: &str = "ImageType";

/// The flat key-value record stored in a sidecar file.
///
/// A volume without a sidecar gets an empty record, which answers `None` for
/// every key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sidecar {
    values: Map<String, Value>,
}

impl Sidecar {
    /// The sidecar path for a volume, `X.json` for `X.nii` or `X.nii.gz`.
    ///
    /// The whole stem is kept, dots included, so `sub-01_acq-1.5mm_T1w.nii.gz`
    /// pairs with `sub-01_acq-1.5mm_T1w.json`.
    pub fn path_for<P: AsRef<Path>>(volume: P) -> Option<PathBuf> {
        let volume = volume.as_ref();
        volume_stem(volume).map(|stem| volume.with_file_name(format!("{stem}.json")))
    }

    /// Parse a sidecar from its text. The top-level value must be a JSON object.
    pub fn from_slice(buf: &[u8], path: &Path) -> Result<Self> {
        serde_json::from_slice(buf)
            .map(|values| Self { values })
            .map_err(|source| NiftiInfoError::SidecarParse {
                path: path.into(),
                source,
            })
    }

    /// Read the sidecar belonging to `volume`, or an empty record if there is
    /// none.
    pub fn load_for<P: AsRef<Path>>(volume: P) -> Result<Self> {
        let volume = volume.as_ref();
        let Some(path) = Self::path_for(volume) else {
            debug!("{} has no volume suffix, not looking for a sidecar", volume.display());
            return Ok(Self::default());
        };
        match fs::read(&path) {
            Ok(buf) => Self::from_slice(&buf, &path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No sidecar found at {}", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(NiftiInfoError::Unreadable { path, source }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a text-valued key. A value of any other JSON type counts as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.as_str()),
            Value::Null => None,
            other => {
                warn!("Ignoring sidecar key {key}, expected a string but found {other}");
                None
            }
        }
    }

    /// Read a key holding an array of strings.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        match self.values.get(key)? {
            Value::Array(items) => {
                let labels: Option<Vec<String>> = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect();
                if labels.is_none() {
                    warn!("Ignoring sidecar key {key}, not every entry is a string");
                }
                labels
            }
            Value::Null => None,
            other => {
                warn!("Ignoring sidecar key {key}, expected a list of strings but found {other}");
                None
            }
        }
    }

    pub fn protocol_name(&self) -> Option<&str> {
        self.get_str(PROTOCOL_NAME)
    }

    pub fn series_description(&self) -> Option<&str> {
        self.get_str(SERIES_DESCRIPTION)
    }

    pub fn image_type(&self) -> Option<Vec<String>> {
        self.get_str_list(IMAGE_TYPE)
    }
}
