use std::fmt::Display;
use std::path;

use crate::io::compression::is_gzipped_extension;

/// Volume file formats that [`niinfo`](crate) knows how to describe
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeFormat {
    /// A single-file NIfTI volume, `.nii`
    Nifti,
    Unknown,
}

impl Display for VolumeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Given a path, infer the file format and whether or not the file at that path is
/// GZIP compressed, judging only by its name.
pub fn infer_from_path<P: Into<path::PathBuf>>(path: P) -> (VolumeFormat, bool) {
    let path: path::PathBuf = path.into();
    let (is_gzipped, path) = is_gzipped_extension(path);
    if let Some(ext) = path.extension() {
        if let Some(ext) = ext.to_ascii_lowercase().to_str() {
            let form = match ext {
                "nii" => VolumeFormat::Nifti,
                _ => VolumeFormat::Unknown,
            };
            (form, is_gzipped)
        } else {
            (VolumeFormat::Unknown, is_gzipped)
        }
    } else {
        (VolumeFormat::Unknown, is_gzipped)
    }
}

/// The file name of `path` without its volume suffix (`.nii` or `.nii.gz`),
/// the stem it shares with its companion files. Returns `None` when the name
/// does not end in a volume suffix. Like [`is_volume_file_name`] this is
/// case-sensitive.
pub fn volume_stem(path: &path::Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(".nii.gz").or_else(|| name.strip_suffix(".nii"))
}

/// Whether a file name matches the patterns searched for when walking
/// directories, `*.nii` and `*.nii.gz`. Unlike [`infer_from_path`] this is
/// case-sensitive, matching the behavior of a shell glob.
pub fn is_volume_file_name(name: &str) -> bool {
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}
