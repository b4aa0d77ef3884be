#![forbid(unsafe_code)]
#![allow(dead_code)]

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod browser;
mod cli;
mod config;
mod db;
mod export;
mod utils;
mod web;

use browser::SqliteBrowser;
use cli::{Cli, Command};
use config::Config;
use db::TableQuery;
use export::ExportReport;
use web::StatusServer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    utils::logging::init_tracing(&config.logging);

    match cli.command_or_default() {
        Command::Export => {
            let report = export(config).await?;
            print_report(&report);
        }
        Command::Serve => StatusServer::new(config.status).start().await?,
        Command::Browse => SqliteBrowser::new()?.launch().await?,
    }

    Ok(())
}

async fn export(config: Config) -> Result<ExportReport> {
    let tables: Vec<TableQuery> = config.export.tables.iter().map(TableQuery::from).collect();
    info!("backing up {} tables", tables.len());

    tokio::task::spawn_blocking(move || {
        export::run_export(&config.database, &tables, Path::new(&config.export.output_root))
    })
    .await
    .context("export task failed")?
    .context("backup failed")
}

fn print_report(report: &ExportReport) {
    if !report.skipped.is_empty() {
        warn!(
            "{} of the configured tables were skipped",
            report.skipped.len()
        );
    }

    println!("Backup completed successfully!");
    println!("Files created:");
    for (kind, path) in report.paths.iter() {
        println!("- {}: {}", kind, path.display());
    }
}
