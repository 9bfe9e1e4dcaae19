use std::path::PathBuf;

/// Failure of a disk-space query or of the backend that runs it.
///
/// No variant carries a partial result: a query either yields both byte
/// counts or one of these.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DiskSpaceError {
    /// The path does not resolve to an accessible filesystem location.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// The OS call itself reported failure. `code` is the raw OS error code.
    #[error("{call} failed for {} (os error {code})", path.display())]
    PlatformCallFailure {
        call: &'static str,
        path: PathBuf,
        code: i32,
    },

    #[error("cannot construct {backend} backend: {reason}")]
    BackendConstructionFailure {
        backend: &'static str,
        reason: String,
    },

    #[error("root set is empty")]
    EmptyRootSet,

    /// Every root in the set reported zero free bytes.
    #[error("no root has free space available")]
    NoRootAvailable,
}

impl DiskSpaceError {
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::PlatformCallFailure { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_invalid_path(&self) -> bool {
        matches!(self, Self::InvalidPath { .. })
    }
}
