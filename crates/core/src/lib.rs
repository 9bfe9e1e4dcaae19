use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

mod backend;
mod bytes;
mod error;
mod roots;

pub use backend::{BackendKind, DiskSpaceBackend};
pub use bytes::{format_bytes, parse_bytes, ParseBytesError};
pub use error::DiskSpaceError;
pub use roots::{RootSet, RootSnapshot, RootSpace};

pub const SPACE_REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Free and total byte counts for the volume backing a path.
///
/// Built fresh for every query. `free_bytes <= total_bytes` is what the OS
/// reports in practice but nothing here enforces it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskSpaceInfo {
    pub free_bytes: u64,
    pub total_bytes: u64,
}

impl DiskSpaceInfo {
    pub const fn new(free_bytes: u64, total_bytes: u64) -> Self {
        Self {
            free_bytes,
            total_bytes,
        }
    }

    pub const fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    /// `None` when the volume reports no capacity at all.
    pub fn free_percent(&self) -> Option<u64> {
        percent_of(self.free_bytes, self.total_bytes)
    }

    pub fn used_percent(&self) -> Option<u64> {
        percent_of(self.used_bytes(), self.total_bytes)
    }
}

fn percent_of(part: u64, whole: u64) -> Option<u64> {
    if whole == 0 {
        return None;
    }
    Some(((part as u128 * 100) / whole as u128) as u64)
}

/// One path's entry in a [`SpaceReport`].
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpaceEntry {
    pub path: PathBuf,
    pub free_bytes: u64,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_percent: Option<u64>,
}

impl SpaceEntry {
    pub fn new(path: impl Into<PathBuf>, space: DiskSpaceInfo) -> Self {
        Self {
            path: path.into(),
            free_bytes: space.free_bytes,
            total_bytes: space.total_bytes,
            used_bytes: space.used_bytes(),
            free_percent: space.free_percent(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpaceReport {
    pub report_id: Uuid,
    pub schema_version: String,
    pub backend: BackendKind,
    pub entries: Vec<SpaceEntry>,
    pub generated_at_utc: String,
}

impl SpaceReport {
    pub fn new(backend: BackendKind, entries: Vec<SpaceEntry>) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            schema_version: SPACE_REPORT_SCHEMA_VERSION.to_string(),
            backend,
            entries,
            generated_at_utc: now_utc_rfc3339(),
        }
    }
}

pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
