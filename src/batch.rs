//! Describing many volumes at once.
use std::path::PathBuf;

use log::error;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use crate::error::{NiftiInfoError, Result};
use crate::metadata::ImageMetadata;

/// What to do when one file in a batch cannot be described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failure and return it
    #[default]
    Abort,
    /// Log the failure, skip the file and carry on with the rest
    Continue,
}

/// Options controlling how a batch of volumes is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOptions {
    pub error_policy: ErrorPolicy,
    /// Decode files on the rayon thread pool. Has no effect unless the
    /// `parallelism` feature is enabled.
    pub parallel: bool,
}

impl BatchOptions {
    pub fn new(error_policy: ErrorPolicy, parallel: bool) -> Self {
        Self {
            error_policy,
            parallel,
        }
    }
}

/// The outcome of a batch run under [`ErrorPolicy::Continue`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per successfully described file, in input order
    pub rows: Vec<ImageMetadata>,
    /// The files that could not be described, in input order
    pub failures: Vec<(PathBuf, NiftiInfoError)>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

fn describe_all(files: &[PathBuf], parallel: bool) -> Vec<Result<ImageMetadata>> {
    #[cfg(feature = "parallelism")]
    if parallel {
        return files.par_iter().map(ImageMetadata::from_path).collect();
    }
    #[cfg(not(feature = "parallelism"))]
    if parallel {
        log::debug!("Parallel processing requested but the `parallelism` feature is not enabled");
    }
    files.iter().map(ImageMetadata::from_path).collect()
}

/// Describe every file in `files`, keeping their order.
///
/// Under [`ErrorPolicy::Abort`] the first failure, in input order, is
/// returned as the error. When decoding sequentially no file after it is
/// opened.
pub fn describe_files(files: &[PathBuf], options: BatchOptions) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    match (options.error_policy, options.parallel) {
        (ErrorPolicy::Abort, false) => {
            for path in files {
                match ImageMetadata::from_path(path) {
                    Ok(info) => report.rows.push(info),
                    Err(err) => {
                        error!("Failed to describe {}", path.display());
                        return Err(err);
                    }
                }
            }
        }
        (policy, parallel) => {
            for (path, result) in files.iter().zip(describe_all(files, parallel)) {
                match result {
                    Ok(info) => report.rows.push(info),
                    Err(err) if policy == ErrorPolicy::Abort => {
                        error!("Failed to describe {}", path.display());
                        return Err(err);
                    }
                    Err(err) => {
                        error!("Skipping {}: {}", path.display(), err);
                        report.failures.push((path.clone(), err));
                    }
                }
            }
        }
    }
    Ok(report)
}
