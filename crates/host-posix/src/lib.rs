//! Disk-space queries on POSIX hosts through `statvfs(3)`.

#[cfg(unix)]
mod space;
#[cfg(not(unix))]
#[path = "space_stub.rs"]
mod space;

use std::path::Path;

use volspace_core::{BackendKind, DiskSpaceBackend, DiskSpaceError, DiskSpaceInfo};

/// Stateless handle onto the `statvfs` query.
///
/// Only [`PosixBackend::new`] builds one, so a backend that exists has
/// passed the platform check:
///
/// ```compile_fail
/// let _ = volspace_host_posix::PosixBackend::default();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PosixBackend {
    _private: (),
}

impl PosixBackend {
    /// Fails with [`DiskSpaceError::BackendConstructionFailure`] off POSIX.
    pub fn new() -> Result<Self, DiskSpaceError> {
        space::ensure_supported()?;
        Ok(Self { _private: () })
    }
}

impl DiskSpaceBackend for PosixBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Posix
    }

    fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
        space::statvfs_space(path)
    }
}

/// Converts block counts into bytes, saturating rather than wrapping.
pub fn space_from_blocks(available_blocks: u64, total_blocks: u64, block_size: u64) -> DiskSpaceInfo {
    DiskSpaceInfo::new(
        available_blocks.saturating_mul(block_size),
        total_blocks.saturating_mul(block_size),
    )
}
