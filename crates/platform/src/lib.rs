//! Picks the disk-space backend compiled in for the running platform.

use std::path::Path;

use tracing::debug;
use volspace_core::{BackendKind, DiskSpaceBackend, DiskSpaceError, DiskSpaceInfo};

/// Backend for the compiled-in platform.
///
/// Every call builds a fresh stateless backend, so repeated calls are
/// interchangeable.
pub fn select_backend() -> Result<Box<dyn DiskSpaceBackend>, DiskSpaceError> {
    #[cfg(windows)]
    {
        let backend = volspace_host_windows::WindowsBackend::new()?;
        debug!(backend = %BackendKind::Windows, "selected disk-space backend");
        return Ok(Box::new(backend));
    }
    #[cfg(unix)]
    {
        let backend = volspace_host_posix::PosixBackend::new()?;
        debug!(backend = %BackendKind::Posix, "selected disk-space backend");
        return Ok(Box::new(backend));
    }
    #[cfg(not(any(windows, unix)))]
    {
        Err(DiskSpaceError::BackendConstructionFailure {
            backend: "native",
            reason: "unsupported OS for disk-space queries".to_string(),
        })
    }
}

pub fn query_disk_space(path: impl AsRef<Path>) -> Result<DiskSpaceInfo, DiskSpaceError> {
    select_backend()?.query_disk_space(path.as_ref())
}
