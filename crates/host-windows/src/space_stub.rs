use std::path::Path;

use volspace_core::{DiskSpaceError, DiskSpaceInfo};

pub(crate) fn ensure_supported() -> Result<(), DiskSpaceError> {
    Err(unsupported())
}

pub(crate) fn volume_space(_path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
    Err(unsupported())
}

fn unsupported() -> DiskSpaceError {
    DiskSpaceError::BackendConstructionFailure {
        backend: "windows",
        reason: "free space query requires Windows".to_string(),
    }
}
