use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("tapthru");
            Some(state_dir.join("tapthru.log"))
        } else {
            ProjectDirs::from("", "", "tapthru")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("tapthru.log"))
        }
    }
}

/// Installs the global tracing subscriber, appending to `path`.
///
/// The terminal belongs to the game while it runs, so events never go to
/// stdout or stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}
