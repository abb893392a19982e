//! Decoding the fixed-layout NIfTI header.
//!
//! Only the fields needed to describe a volume are read: `sizeof_hdr`, which
//! tells us both the layout version and the byte order of the file, followed
//! by the `dim` and `pixdim` arrays. Both NIfTI-1 (348 bytes) and NIfTI-2
//! (540 bytes) headers are understood.
use std::io::{self, prelude::*};
use std::path::PathBuf;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use crate::error::{NiftiInfoError, Result};

/// The byte order a header was written in.
///
/// NIfTI files carry no explicit byte order flag, so this is inferred from
/// the `sizeof_hdr` field and must then be applied to every multi-byte field
/// of the same header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Self::Little => LittleEndian::read_i16(buf),
            Self::Big => BigEndian::read_i16(buf),
        }
    }

    pub fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Self::Little => LittleEndian::read_i32(buf),
            Self::Big => BigEndian::read_i32(buf),
        }
    }

    pub fn read_i64(self, buf: &[u8]) -> i64 {
        match self {
            Self::Little => LittleEndian::read_i64(buf),
            Self::Big => BigEndian::read_i64(buf),
        }
    }

    pub fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Little => LittleEndian::read_f32(buf),
            Self::Big => BigEndian::read_f32(buf),
        }
    }

    pub fn read_f64(self, buf: &[u8]) -> f64 {
        match self {
            Self::Little => LittleEndian::read_f64(buf),
            Self::Big => BigEndian::read_f64(buf),
        }
    }
}

/// The NIfTI header layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NiftiVersion {
    /// 348-byte header with 16-bit `dim` and 32-bit `pixdim`
    Nifti1,
    /// 540-byte header with 64-bit `dim` and 64-bit `pixdim`
    Nifti2,
}

impl NiftiVersion {
    pub const fn header_size(self) -> usize {
        match self {
            Self::Nifti1 => NIFTI1_HEADER_SIZE,
            Self::Nifti2 => NIFTI2_HEADER_SIZE,
        }
    }

    const fn dim_offset(self) -> usize {
        match self {
            Self::Nifti1 => 40,
            Self::Nifti2 => 16,
        }
    }

    const fn pixdim_offset(self) -> usize {
        match self {
            Self::Nifti1 => 76,
            Self::Nifti2 => 104,
        }
    }

    /// Match a `sizeof_hdr` value against the known header sizes
    pub fn from_sizeof_hdr(sizeof_hdr: i32) -> Option<Self> {
        match sizeof_hdr {
            348 => Some(Self::Nifti1),
            540 => Some(Self::Nifti2),
            _ => None,
        }
    }
}

pub const NIFTI1_HEADER_SIZE: usize = 348;
pub const NIFTI2_HEADER_SIZE: usize = 540;

/// Work out the header layout and byte order from the first four bytes of a
/// header. Little-endian is tried first.
pub fn detect_layout(sizeof_hdr: [u8; 4]) -> Result<(NiftiVersion, Endianness)> {
    for endianness in [Endianness::Little, Endianness::Big] {
        if let Some(version) = NiftiVersion::from_sizeof_hdr(endianness.read_i32(&sizeof_hdr)) {
            return Ok((version, endianness));
        }
    }
    Err(NiftiInfoError::InvalidHeader { bytes: sizeof_hdr })
}

/// The parts of a NIfTI header that describe the voxel grid.
///
/// Values are widened to `i64`/`f64` so the NIfTI-1 and NIfTI-2 layouts
/// share a representation; [`NiftiHeader::version`] records which one the
/// values came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    pub version: NiftiVersion,
    pub endianness: Endianness,
    /// `dim[0]` is the number of meaningful dimensions, `dim[1..]` their extents
    pub dim: [i64; 8],
    /// `pixdim[0]` is the qform handedness factor, `pixdim[1..]` the voxel spacing
    pub pixdim: [f64; 8],
}

impl NiftiHeader {
    /// Decode a header from a stream positioned at its first byte.
    ///
    /// At most the fixed header size is consumed from `stream`. A read failure
    /// is reported as [`NiftiInfoError::Unreadable`] with an empty path, see
    /// [`NiftiInfoError::at_path`].
    pub fn decode<R: Read>(stream: &mut R) -> Result<Self> {
        let mut block = vec![0u8; NIFTI2_HEADER_SIZE];

        let found = read_up_to(stream, &mut block[..4])?;
        if found < 4 {
            return Err(NiftiInfoError::TruncatedHeader {
                expected: NIFTI1_HEADER_SIZE,
                found,
            });
        }
        let (version, endianness) = detect_layout([block[0], block[1], block[2], block[3]])?;
        let expected = version.header_size();

        let found = 4 + read_up_to(stream, &mut block[4..expected])?;
        if found < expected {
            return Err(NiftiInfoError::TruncatedHeader { expected, found });
        }
        Ok(Self::from_block(&block[..expected], version, endianness))
    }

    /// Decode a header from an in-memory buffer that starts at the header.
    pub fn decode_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() < 4 {
            return Err(NiftiInfoError::TruncatedHeader {
                expected: NIFTI1_HEADER_SIZE,
                found: buf.len(),
            });
        }
        let (version, endianness) = detect_layout([buf[0], buf[1], buf[2], buf[3]])?;
        let expected = version.header_size();
        if buf.len() < expected {
            return Err(NiftiInfoError::TruncatedHeader {
                expected,
                found: buf.len(),
            });
        }
        Ok(Self::from_block(&buf[..expected], version, endianness))
    }

    fn from_block(block: &[u8], version: NiftiVersion, endianness: Endianness) -> Self {
        debug!("Decoding {version:?} header in {endianness:?} endian byte order");
        let mut dim = [0i64; 8];
        let mut pixdim = [0f64; 8];

        let dim_start = version.dim_offset();
        let pixdim_start = version.pixdim_offset();
        match version {
            NiftiVersion::Nifti1 => {
                for (i, chunk) in block[dim_start..dim_start + 16].chunks_exact(2).enumerate() {
                    dim[i] = endianness.read_i16(chunk).into();
                }
                for (i, chunk) in block[pixdim_start..pixdim_start + 32]
                    .chunks_exact(4)
                    .enumerate()
                {
                    pixdim[i] = endianness.read_f32(chunk).into();
                }
            }
            NiftiVersion::Nifti2 => {
                for (i, chunk) in block[dim_start..dim_start + 64].chunks_exact(8).enumerate() {
                    dim[i] = endianness.read_i64(chunk);
                }
                for (i, chunk) in block[pixdim_start..pixdim_start + 64]
                    .chunks_exact(8)
                    .enumerate()
                {
                    pixdim[i] = endianness.read_f64(chunk);
                }
            }
        }

        Self {
            version,
            endianness,
            dim,
            pixdim,
        }
    }

    /// The extents of the first four axes, `dim[1..=4]`
    pub fn shape(&self) -> [i64; 4] {
        [self.dim[1], self.dim[2], self.dim[3], self.dim[4]]
    }

    /// The voxel spacing along the first four axes, `pixdim[1..=4]`
    pub fn pixdims(&self) -> [f64; 4] {
        [self.pixdim[1], self.pixdim[2], self.pixdim[3], self.pixdim[4]]
    }

    /// The fourth axis extent times its spacing.
    ///
    /// The product is formed at the precision the header stores `pixdim` in,
    /// so a NIfTI-1 header gives the single precision result. Nothing checks
    /// that the fourth axis is actually time.
    pub fn seconds(&self) -> f64 {
        match self.version {
            NiftiVersion::Nifti1 => (self.dim[4] as f32 * self.pixdim[4] as f32).into(),
            NiftiVersion::Nifti2 => self.dim[4] as f64 * self.pixdim[4],
        }
    }
}

/// Fill as much of `buf` as the stream allows, returning the number of bytes
/// read. Unlike [`Read::read_exact`] a short stream is not an error here, so
/// the caller can report how many bytes were actually available.
fn read_up_to<R: Read>(stream: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            // A corrupt gzip member shows up as an error part way through the
            // header, which is a short header as far as we are concerned.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::UnexpectedEof
                        | io::ErrorKind::InvalidInput
                        | io::ErrorKind::InvalidData
                ) =>
            {
                debug!("Stream ended early while reading header: {e}");
                break;
            }
            Err(e) => {
                return Err(NiftiInfoError::Unreadable {
                    path: PathBuf::new(),
                    source: e,
                })
            }
        }
    }
    Ok(filled)
}
