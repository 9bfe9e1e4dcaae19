use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use volspace_core::{
    format_bytes, parse_bytes, BackendKind, DiskSpaceBackend, DiskSpaceError, DiskSpaceInfo,
    RootSet, RootSpace, SpaceEntry, SpaceReport,
};
use volspace_platform::select_backend;

mod config;

use config::{load_roots_config, RootsConfig};

#[derive(Debug, Parser)]
#[command(name = "volspace", about = "Free and total disk space per volume")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Free and total bytes for the volume behind each path.
    Query {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        pretty: bool,
        /// Print formatted sizes instead of JSON.
        #[arg(long)]
        human: bool,
    },
    /// Totals, most-free root and low roots for a set of storage roots.
    Roots {
        #[arg(long, conflicts_with = "paths")]
        config: Option<PathBuf>,
        paths: Vec<PathBuf>,
        /// Minimum free space per root, e.g. `10G`.
        #[arg(long)]
        min_free: Option<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Name the backend compiled in for this platform.
    Backend,
}

#[derive(Debug, Serialize)]
struct RootsReport {
    backend: BackendKind,
    totals: DiskSpaceInfo,
    most_free: Option<RootSpace>,
    min_free: Option<u64>,
    below_minimum: Vec<RootSpace>,
    roots: Vec<RootSpace>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    enable_logging(&cli.log_level)?;

    match cli.command {
        Command::Query {
            paths,
            pretty,
            human,
        } => run_query(&paths, pretty, human),
        Command::Roots {
            config,
            paths,
            min_free,
            pretty,
        } => run_roots(config, paths, min_free, pretty),
        Command::Backend => {
            let backend = select_backend().context("select disk-space backend")?;
            println!("{}", backend.kind());
            Ok(())
        }
    }
}

fn run_query(paths: &[PathBuf], pretty: bool, human: bool) -> Result<()> {
    let backend = select_backend().context("select disk-space backend")?;
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let space = backend
            .query_disk_space(path)
            .with_context(|| format!("query disk space for {}", path.display()))?;
        entries.push(SpaceEntry::new(path.as_path(), space));
    }

    if human {
        for entry in &entries {
            println!(
                "{}: {} free of {} ({} free)",
                entry.path.display(),
                format_bytes(entry.free_bytes),
                format_bytes(entry.total_bytes),
                entry
                    .free_percent
                    .map(|p| format!("{p}%"))
                    .unwrap_or_else(|| "n/a".to_string()),
            );
        }
        return Ok(());
    }

    print_json(&SpaceReport::new(backend.kind(), entries), pretty)
}

fn run_roots(
    config: Option<PathBuf>,
    paths: Vec<PathBuf>,
    min_free: Option<String>,
    pretty: bool,
) -> Result<()> {
    let config = config.map(|file| load_roots_config(&file)).transpose()?;
    let (roots, min_free) = resolve_roots(config, paths, min_free.as_deref())?;
    let roots = RootSet::new(roots).context("build root set")?;
    let backend = select_backend().context("select disk-space backend")?;
    let report = roots_report(&roots, backend.as_ref(), min_free)?;
    print_json(&report, pretty)
}

/// Root list and minimum free space from either a config file or the
/// command line. A `--min-free` value wins over the config's `min_free`.
fn resolve_roots(
    config: Option<RootsConfig>,
    paths: Vec<PathBuf>,
    min_free: Option<&str>,
) -> Result<(Vec<PathBuf>, Option<u64>)> {
    let (roots, config_min_free) = match config {
        Some(config) => {
            let min_free = config.min_free_bytes()?;
            (config.roots, min_free)
        }
        None if paths.is_empty() => {
            return Err(anyhow!("either --config or root paths are required"))
        }
        None => (paths, None),
    };
    let min_free = match min_free {
        Some(value) => Some(
            parse_bytes(value).with_context(|| format!("invalid --min-free {value:?}"))?,
        ),
        None => config_min_free,
    };
    Ok((roots, min_free))
}

/// Builds the report from a single snapshot so every figure comes from
/// the same pass over the roots.
fn roots_report(
    roots: &RootSet,
    backend: &dyn DiskSpaceBackend,
    min_free: Option<u64>,
) -> Result<RootsReport> {
    let snapshot = roots.snapshot(backend)?;
    debug!(roots = snapshot.entries().len(), backend = %backend.kind(), "checked roots");

    let most_free = match snapshot.most_free() {
        Ok(root) => Some(root.clone()),
        Err(DiskSpaceError::NoRootAvailable) => None,
        Err(err) => return Err(err.into()),
    };
    let below_minimum = match min_free {
        Some(min) => snapshot.below_minimum(min).into_iter().cloned().collect(),
        None => Vec::new(),
    };

    Ok(RootsReport {
        backend: backend.kind(),
        totals: snapshot.totals(),
        most_free,
        min_free,
        below_minimum,
        roots: snapshot.into_entries(),
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn enable_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install log subscriber")?;
    debug!("logging enabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GIB: u64 = 1024 * 1024 * 1024;

    struct FakeBackend {
        volumes: HashMap<PathBuf, DiskSpaceInfo>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(entries: &[(&str, u64, u64)]) -> Self {
            Self {
                volumes: entries
                    .iter()
                    .map(|(path, free, total)| (PathBuf::from(path), DiskSpaceInfo::new(*free, *total)))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DiskSpaceBackend for FakeBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Posix
        }

        fn query_disk_space(&self, path: &Path) -> Result<DiskSpaceInfo, DiskSpaceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.volumes
                .get(path)
                .copied()
                .ok_or_else(|| DiskSpaceError::invalid_path(path, "not found"))
        }
    }

    fn root_set(paths: &[&str]) -> RootSet {
        RootSet::new(paths.iter().map(PathBuf::from).collect()).unwrap()
    }

    fn config(min_free: Option<&str>) -> RootsConfig {
        RootsConfig {
            roots: vec![PathBuf::from("/srv/a"), PathBuf::from("/srv/b")],
            min_free: min_free.map(str::to_string),
        }
    }

    #[test]
    fn min_free_flag_overrides_config() {
        let (roots, min_free) = resolve_roots(Some(config(Some("10G"))), Vec::new(), Some("1G")).unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(min_free, Some(GIB));
    }

    #[test]
    fn config_min_free_applies_without_flag() {
        let (_, min_free) = resolve_roots(Some(config(Some("10G"))), Vec::new(), None).unwrap();
        assert_eq!(min_free, Some(10 * GIB));
    }

    #[test]
    fn command_line_roots_have_no_default_minimum() {
        let (roots, min_free) = resolve_roots(None, vec![PathBuf::from("/x")], None).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/x")]);
        assert_eq!(min_free, None);
    }

    #[test]
    fn roots_need_config_or_paths() {
        let err = resolve_roots(None, Vec::new(), None).unwrap_err();
        assert!(err.to_string().contains("either --config or root paths"));
    }

    #[test]
    fn bad_min_free_flag_is_reported() {
        let err = resolve_roots(None, vec![PathBuf::from("/x")], Some("plenty")).unwrap_err();
        assert!(err.to_string().contains("--min-free"));
    }

    #[test]
    fn report_comes_from_one_snapshot() {
        let backend = FakeBackend::new(&[("/a", 10, 100), ("/b", 50, 200), ("/c", 5, 100)]);
        let report = roots_report(&root_set(&["/a", "/b", "/c"]), &backend, Some(10)).unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.totals, DiskSpaceInfo::new(65, 400));
        assert_eq!(report.most_free.as_ref().map(|r| r.root.clone()), Some(PathBuf::from("/b")));
        assert_eq!(report.below_minimum.len(), 1);
        assert_eq!(report.below_minimum[0].root, PathBuf::from("/c"));
        assert_eq!(report.roots.len(), 3);
    }

    #[test]
    fn full_roots_report_null_most_free() {
        let backend = FakeBackend::new(&[("/a", 0, 100), ("/b", 0, 100)]);
        let report = roots_report(&root_set(&["/a", "/b"]), &backend, None).unwrap();
        assert!(report.most_free.is_none());
        assert!(report.below_minimum.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["most_free"].is_null());
        assert_eq!(json["backend"], "posix");
    }

    #[test]
    fn failing_root_fails_the_report() {
        let backend = FakeBackend::new(&[("/a", 10, 100)]);
        let err = roots_report(&root_set(&["/a", "/gone"]), &backend, None).unwrap_err();
        assert!(err.to_string().contains("/gone"));
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_requires_a_path() {
        assert!(Cli::try_parse_from(["volspace", "query"]).is_err());
    }

    #[test]
    fn roots_config_conflicts_with_paths() {
        let parsed = Cli::try_parse_from(["volspace", "roots", "--config", "r.json", "/srv"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_roots_with_min_free() {
        let cli = Cli::try_parse_from(["volspace", "roots", "/a", "/b", "--min-free", "10G"]).unwrap();
        match cli.command {
            Command::Roots { paths, min_free, .. } => {
                assert_eq!(paths.len(), 2);
                assert_eq!(min_free.as_deref(), Some("10G"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::try_parse_from(["volspace", "backend", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
    }
}
