//! Sets of storage roots and the placement questions asked about them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{DiskSpaceBackend, DiskSpaceError, DiskSpaceInfo};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RootSpace {
    pub root: PathBuf,
    pub space: DiskSpaceInfo,
}

/// An ordered list of root directories, none nested inside another.
///
/// Distinct roots that share a volume are still counted once each in
/// [`RootSnapshot::totals`].
#[derive(Debug, Clone)]
pub struct RootSet {
    roots: Vec<PathBuf>,
}

impl RootSet {
    pub fn new(roots: Vec<PathBuf>) -> Result<Self, DiskSpaceError> {
        if roots.is_empty() {
            return Err(DiskSpaceError::EmptyRootSet);
        }
        for (i, root) in roots.iter().enumerate() {
            if root.as_os_str().is_empty() {
                return Err(DiskSpaceError::invalid_path(root, "empty root path"));
            }
            for other in &roots[..i] {
                if other == root {
                    return Err(DiskSpaceError::invalid_path(root, "root listed twice"));
                }
                // Component-wise, so /srv/ab does not overlap /srv/a.
                if root.starts_with(other) || other.starts_with(root) {
                    return Err(DiskSpaceError::invalid_path(
                        root,
                        format!("overlapping roots {} and {}", other.display(), root.display()),
                    ));
                }
            }
        }
        Ok(Self { roots })
    }

    /// Queries every root once, in order. The first failure aborts the snapshot.
    pub fn snapshot<B>(&self, backend: &B) -> Result<RootSnapshot, DiskSpaceError>
    where
        B: DiskSpaceBackend + ?Sized,
    {
        let entries = self
            .roots
            .iter()
            .map(|root| query_root(backend, root))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RootSnapshot { entries })
    }
}

/// Space of every root in a [`RootSet`], taken at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSnapshot {
    entries: Vec<RootSpace>,
}

impl RootSnapshot {
    pub fn entries(&self) -> &[RootSpace] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RootSpace> {
        self.entries
    }

    /// The root with the most free bytes; on a tie the earlier root wins.
    pub fn most_free(&self) -> Result<&RootSpace, DiskSpaceError> {
        let mut best: Option<&RootSpace> = None;
        for entry in &self.entries {
            let best_free = best.map_or(0, |b| b.space.free_bytes);
            if entry.space.free_bytes > best_free {
                best = Some(entry);
            }
        }
        let best = best.ok_or(DiskSpaceError::NoRootAvailable)?;
        debug!(root = %best.root.display(), free_bytes = best.space.free_bytes, "selected most free root");
        Ok(best)
    }

    pub fn totals(&self) -> DiskSpaceInfo {
        self.entries
            .iter()
            .fold(DiskSpaceInfo::default(), |acc, entry| DiskSpaceInfo {
                free_bytes: acc.free_bytes.saturating_add(entry.space.free_bytes),
                total_bytes: acc.total_bytes.saturating_add(entry.space.total_bytes),
            })
    }

    /// Roots whose free bytes are strictly below `min_free`.
    pub fn below_minimum(&self, min_free: u64) -> Vec<&RootSpace> {
        let low: Vec<&RootSpace> = self
            .entries
            .iter()
            .filter(|entry| entry.space.free_bytes < min_free)
            .collect();
        for entry in &low {
            warn!(
                root = %entry.root.display(),
                free_bytes = entry.space.free_bytes,
                min_free,
                "root below minimum free space"
            );
        }
        low
    }
}

fn query_root<B>(backend: &B, root: &Path) -> Result<RootSpace, DiskSpaceError>
where
    B: DiskSpaceBackend + ?Sized,
{
    let space = backend.query_disk_space(root)?;
    Ok(RootSpace {
        root: root.to_path_buf(),
        space,
    })
}
