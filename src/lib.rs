//! Summarize NIfTI volumes, and the JSON sidecars written next to them, as
//! rows of a table.
//!
//! Each volume goes through the same three steps: [`HeaderSource`] opens the
//! file (decompressing it if needed), [`NiftiHeader`] decodes the fixed-size
//! header, and [`ImageMetadata`] merges the header with the sidecar.
//!
//! ```no_run
//! # fn main() -> niinfo::Result<()> {
//! let info = niinfo::ImageMetadata::from_path("sub-01/func/sub-01_task-rest_bold.nii.gz")?;
//! println!("{:?} voxels, {} seconds", info.shape, info.seconds);
//! # Ok(())
//! # }
//! ```
pub mod batch;
pub mod discovery;
pub mod error;
pub mod header;
pub mod io;
pub mod metadata;
pub mod sidecar;

pub use crate::batch::{describe_files, BatchOptions, BatchReport, ErrorPolicy};
pub use crate::discovery::collect_volume_files;
pub use crate::error::{NiftiInfoError, Result};
pub use crate::header::{Endianness, NiftiHeader, NiftiVersion};
pub use crate::io::{HeaderSource, TsvWriter};
pub use crate::metadata::ImageMetadata;
pub use crate::sidecar::Sidecar;
