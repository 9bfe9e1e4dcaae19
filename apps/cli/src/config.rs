use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use volspace_core::parse_bytes;

/// Root list read from a JSON file, e.g.
/// `{ "roots": ["/srv/a", "/srv/b"], "min_free": "10G" }`.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct RootsConfig {
    pub roots: Vec<PathBuf>,
    #[serde(default)]
    pub min_free: Option<String>,
}

impl RootsConfig {
    pub fn min_free_bytes(&self) -> Result<Option<u64>> {
        self.min_free
            .as_deref()
            .map(|value| parse_bytes(value).with_context(|| format!("invalid min_free {value:?}")))
            .transpose()
    }
}

pub fn load_roots_config(path: impl AsRef<Path>) -> Result<RootsConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read roots config {}", path.display()))?;
    let config: RootsConfig = serde_json::from_str(&data)
        .with_context(|| format!("parse roots config {}", path.display()))?;
    Ok(config)
}
