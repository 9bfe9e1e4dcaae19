use std::path::Path;

use volspace_core::{DiskSpaceError, DiskSpaceInfo};

pub(crate) fn ensure_supported() -> Result<(), DiskSpaceError> {
    Err(unsupported())
}

pub(crate) fn statvfs_space(_path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
    Err(unsupported())
}

fn unsupported() -> DiskSpaceError {
    DiskSpaceError::BackendConstructionFailure {
        backend: "posix",
        reason: "statvfs queries require a POSIX host".to_string(),
    }
}
