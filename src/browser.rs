use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::info;

const PROGRAM: &str = "sqlite_web";
const DB_FILE: &str = "working.db";
const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const THEME: &str = "dark";
const ROWS_PER_PAGE: u32 = 50;
const URL_PREFIX: &str = "/db";
const MOBILE_CSS: &str = r#"
@media (max-width: 768px) {
    .container { padding: 10px; }
    .table-responsive { overflow-x: auto; }
    .navbar-brand { font-size: 1.2rem; }
}
"#;

/// Read-only `sqlite_web` session over `working.db`.
pub struct SqliteBrowser {
    db_path: PathBuf,
}

impl SqliteBrowser {
    pub fn new() -> Result<Self> {
        let db_path = std::path::absolute(DB_FILE)
            .with_context(|| format!("failed to resolve {}", DB_FILE))?;
        Ok(Self { db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn args(&self) -> Vec<OsString> {
        let port = PORT.to_string();
        let rows_per_page = ROWS_PER_PAGE.to_string();
        let mut args: Vec<OsString> = [
            "--host",
            HOST,
            "--port",
            port.as_str(),
            "--no-browser",
            "--read-only",
            "--theme",
            THEME,
            "--rows-per-page",
            rows_per_page.as_str(),
            "--url-prefix",
            URL_PREFIX,
            "--css",
            MOBILE_CSS,
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(self.db_path.clone().into_os_string());
        args
    }

    /// Runs the browser in the foreground until it exits.
    pub async fn launch(&self) -> Result<()> {
        info!(
            "Starting SQLite Web server for database: {}",
            self.db_path.display()
        );
        info!("Access the database at http://{}:{}", HOST, PORT);

        let status = Command::new(PROGRAM)
            .args(self.args())
            .status()
            .await
            .with_context(|| format!("failed to start {}", PROGRAM))?;

        if !status.success() {
            bail!("{} exited with {}", PROGRAM, status);
        }
        Ok(())
    }
}
