//! Expanding command line inputs into the list of volumes to describe.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{NiftiInfoError, Result};
use crate::io::is_volume_file_name;

/// Sort located files by their canonical path and drop duplicates.
///
/// Each item pairs a canonical path with the path the file was located
/// under. The first located path seen for a canonical path is kept.
pub fn dedup_sorted<I: IntoIterator<Item = (PathBuf, PathBuf)>>(paths: I) -> Vec<PathBuf> {
    let mut by_canonical = BTreeMap::new();
    for (canonical, located) in paths {
        by_canonical.entry(canonical).or_insert(located);
    }
    by_canonical.into_values().collect()
}

/// Recursively find `*.nii` and `*.nii.gz` files beneath `root`.
///
/// Symbolic links to files are included, symbolic links to directories are
/// not descended into.
pub fn find_volume_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            NiftiInfoError::Unreadable {
                path,
                source: io::Error::from(e),
            }
        })?;
        let is_match = entry
            .file_name()
            .to_str()
            .is_some_and(is_volume_file_name);
        if is_match && entry.path().is_file() {
            found.push(entry.into_path());
        }
    }
    debug!("Found {} volume files under {}", found.len(), root.display());
    Ok(found)
}

/// Expand input paths into the list of volumes to describe. Directories are
/// searched recursively, anything else is taken as a volume file as given.
///
/// The result is sorted and de-duplicated on canonical paths, but each entry
/// is the path the file was located under. A symbolic link therefore keeps
/// the sidecar sitting next to the link rather than next to its target.
pub fn collect_volume_files<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            files.extend(find_volume_files(input)?);
        } else {
            files.push(input.to_path_buf());
        }
    }
    let located = files
        .into_iter()
        .map(|p| match fs::canonicalize(&p) {
            Ok(canonical) => Ok((canonical, p)),
            Err(e) => Err(NiftiInfoError::from_io(p, e)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(dedup_sorted(located))
}
