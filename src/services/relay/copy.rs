//! Copy Primitive
//!
//! Byte-for-byte file copy that replicates the source timestamps onto the
//! destination. Shared by forward and backward sync.

use filetime::FileTime;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::utils::error::{RelayError, RelayResult};

/// Copy `src` over `dst` and give `dst` the same mtime as `src`.
///
/// After a successful copy the destination mtime equals the source mtime,
/// which keeps the conflict check quiet until something else touches `dst`.
pub fn copy_file(src: &Path, dst: &Path) -> RelayResult<u64> {
    let mut src_file =
        File::open(src).map_err(|e| RelayError::sync("failed to open src file", src, e))?;
    let mut dst_file =
        File::create(dst).map_err(|e| RelayError::sync("failed to create dst file", dst, e))?;

    let copied = io::copy(&mut src_file, &mut dst_file)
        .map_err(|e| RelayError::sync("failed to copy", dst, e))?;
    drop(dst_file);

    let metadata = src_file
        .metadata()
        .map_err(|e| RelayError::sync("failed to stat src file", src, e))?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);

    filetime::set_file_times(dst, atime, mtime)
        .map_err(|e| RelayError::sync("failed to set dst times", dst, e))?;

    Ok(copied)
}
