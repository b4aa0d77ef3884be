use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "db-backup", version, about = "Database snapshots and SQLite status tooling")]
pub struct Cli {
    /// YAML config file. Defaults to ./config.yaml when it exists.
    #[arg(long, short, env = "CONFIG_PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Dump the configured tables to JSON, ZIP and SQL (the default).
    Export,
    /// Serve the SQLite status page and file download.
    Serve,
    /// Launch sqlite_web over working.db.
    Browse,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.unwrap_or(Command::Export)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_means_export() {
        let cli = Cli::try_parse_from(["db-backup"]).expect("parse");
        assert_eq!(cli.command_or_default(), Command::Export);
    }

    #[test]
    fn subcommands_and_config_flag_parse() {
        let cli = Cli::try_parse_from(["db-backup", "serve", "--config", "/etc/db-backup.yaml"])
            .expect("parse");
        assert_eq!(cli.command_or_default(), Command::Serve);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/db-backup.yaml")));
    }
}
