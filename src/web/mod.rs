use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use salvo::cors::{Any, Cors};
use salvo::http::Method;
use salvo::prelude::*;
use tracing::info;

use crate::config::StatusConfig;

pub mod handlers;

use self::handlers::status::{DbDownload, DbFile, DbStatus, StatusPage};

pub fn create_router(db: Arc<DbFile>) -> Router {
    Router::new()
        .get(StatusPage::new(db.clone()))
        .push(Router::with_path("db-status").get(DbStatus::new(db.clone())))
        .push(Router::with_path("sqlite.db").get(DbDownload::new(db)))
}

pub fn create_service(db: Arc<DbFile>) -> Service {
    let cors = Cors::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::HEAD, Method::OPTIONS])
        .into_handler();

    Service::new(create_router(db)).hoop(cors)
}

/// Read-only HTTP view of one SQLite file.
#[derive(Clone)]
pub struct StatusServer {
    config: StatusConfig,
}

impl StatusServer {
    pub fn new(config: StatusConfig) -> Self {
        Self { config }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        std::path::absolute(&self.config.db_file).with_context(|| {
            format!(
                "failed to resolve database path {}",
                self.config.db_file.display()
            )
        })
    }

    pub async fn start(&self) -> Result<()> {
        let db_path = self.db_path()?;
        let bind_addr = format!("{}:{}", self.config.bind_address, self.config.port);
        info!("Starting DB server on http://{}/sqlite.db", bind_addr);
        info!("Database status at http://{}/db-status", bind_addr);
        info!("Serving {}", db_path.display());

        let acceptor = TcpListener::new(bind_addr).bind().await;
        Server::new(acceptor)
            .serve(create_service(Arc::new(DbFile::new(db_path))))
            .await;

        Ok(())
    }
}
