use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_FILE_NAME: &str = "tutoring.sqlite3";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Command line for the sidecar. Everything else arrives over stdio.
#[derive(Debug, Parser)]
#[command(name = "tutoringd", version, about = "Peer tutoring data sidecar")]
pub struct Cli {
    /// Workspace directory holding the tutoring database. Can also be chosen
    /// later with `workspace.select`.
    #[arg(long, env = "TUTORINGD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// How long a statement waits on a locked database before failing.
    #[arg(long, default_value_t = DEFAULT_BUSY_TIMEOUT_MS)]
    pub busy_timeout_ms: u64,
}

impl Cli {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Where the store lives and how to talk to it. Handed to `Dal::new`; nothing
/// about the store location is compiled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub workspace: PathBuf,
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        let db_path = workspace.join(DB_FILE_NAME);
        Self {
            workspace,
            db_path,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_lives_inside_workspace() {
        let cfg = StoreConfig::new("/tmp/tutoring-ws").with_busy_timeout(Duration::from_millis(250));
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/tutoring-ws").join(DB_FILE_NAME));
        assert_eq!(cfg.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn cli_reads_workspace_and_timeout() {
        let cli = Cli::parse_from(["tutoringd", "--workspace", "/data/ws", "--busy-timeout-ms", "42"]);
        assert_eq!(cli.workspace, Some(PathBuf::from("/data/ws")));
        assert_eq!(cli.busy_timeout(), Duration::from_millis(42));
    }
}
