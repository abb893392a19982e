//! Getting at the bytes of a volume file and writing summaries out.
//!
//! Volumes may be stored plain or GZIP compressed; [`HeaderSource`] hides the
//! difference from the header decoder.

pub(crate) mod compression;
mod infer_format;
pub mod tsv;

pub use crate::io::compression::HeaderSource;
pub use crate::io::infer_format::{
    infer_from_path, is_volume_file_name, volume_stem, VolumeFormat,
};
pub use crate::io::tsv::TsvWriter;

pub use compression::{is_gzipped, is_gzipped_extension};
