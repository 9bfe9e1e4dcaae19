use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DiskSpaceError, DiskSpaceInfo};

/// Which OS call a backend is built on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Posix,
    Windows,
}

impl BackendKind {
    /// The kind compiled in for this target, if any.
    pub const fn current() -> Option<Self> {
        if cfg!(windows) {
            Some(Self::Windows)
        } else if cfg!(unix) {
            Some(Self::Posix)
        } else {
            None
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Posix => "posix",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform disk-space query.
///
/// Implementations hold no mutable state, so one instance can serve
/// concurrent queries from any number of threads.
pub trait DiskSpaceBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Free and total bytes of the volume that `path` lives on.
    ///
    /// # Errors
    ///
    /// - [`DiskSpaceError::InvalidPath`] when the path cannot be resolved
    /// - [`DiskSpaceError::PlatformCallFailure`] for any other OS failure
    fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError>;
}

impl<B: DiskSpaceBackend + ?Sized> DiskSpaceBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
        (**self).query_disk_space(path)
    }
}

impl<B: DiskSpaceBackend + ?Sized> DiskSpaceBackend for &B {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
        (**self).query_disk_space(path)
    }
}
