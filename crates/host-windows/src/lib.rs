//! Disk-space queries on Windows through `GetDiskFreeSpaceExW`.

#[cfg(windows)]
mod space;
#[cfg(not(windows))]
#[path = "space_stub.rs"]
mod space;

use std::path::Path;

use volspace_core::{BackendKind, DiskSpaceBackend, DiskSpaceError, DiskSpaceInfo};

/// Stateless handle onto the volume free-space query.
///
/// `free_bytes` is the space available to the calling account, so it
/// already reflects any disk quota; `total_bytes` is the whole volume.
/// It can only be built through [`WindowsBackend::new`]:
///
/// ```compile_fail
/// let _ = volspace_host_windows::WindowsBackend::default();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WindowsBackend {
    _private: (),
}

impl WindowsBackend {
    pub fn new() -> Result<Self, DiskSpaceError> {
        space::ensure_supported()?;
        Ok(Self { _private: () })
    }
}

impl DiskSpaceBackend for WindowsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Windows
    }

    fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
        space::volume_space(path)
    }
}
