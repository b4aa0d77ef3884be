use std::path::{Path, PathBuf};
use std::sync::Arc;

use salvo::fs::NamedFile;
use salvo::http::header;
use salvo::http::mime::Mime;
use salvo::http::uri::Authority;
use salvo::prelude::*;
use serde_json::json;
use tracing::error;

const DOWNLOAD_NAME: &str = "sqlite.db";
const NOT_FOUND_MESSAGE: &str = "Database file not found";
const SQLITE_MIME: &str = "application/x-sqlite3";

/// The SQLite file the server reports on.
#[derive(Debug, Clone)]
pub struct DbFile {
    path: PathBuf,
}

impl DbFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes, or `None` when the file is absent.
    pub async fn size(&self) -> Option<u64> {
        tokio::fs::metadata(&self.path)
            .await
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }
}

pub(crate) fn size_mb(bytes: u64) -> f64 {
    (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// The `Host` header when it parses as a URI authority. Anything else falls
/// back to the request URI, then to `localhost`.
fn request_host(req: &Request) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<Authority>().ok())
        .or_else(|| req.uri().authority().cloned())
        .map(|a| a.to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

pub(crate) fn render_status_page(size: Option<u64>, download_url: &str) -> String {
    let body = match size {
        Some(bytes) => format!(
            r#"<div class="status success">Database is available<br>Size: {size:.2} MB</div>
        <div class="info">
            <p><strong>Connecting:</strong></p>
            <div class="step">1. Open DB Browser for SQLite</div>
            <div class="step">2. Choose "Remote" -&gt; "Connect to Database"</div>
            <div class="step">3. Enter the URL: <code>{url}</code></div>
            <div class="step">The URL must match your application's domain.</div>
        </div>"#,
            size = size_mb(bytes),
            url = download_url,
        ),
        None => r#"<div class="status error">Database not found</div>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Database Status</title>
    <style>
        body {{ font-family: system-ui, -apple-system, sans-serif; margin: 0; padding: 20px; background: #f0f0f0; }}
        .container {{ max-width: 600px; margin: 0 auto; background: white; padding: 20px; border-radius: 10px; }}
        .status {{ padding: 15px; border-radius: 5px; margin: 10px 0; }}
        .success {{ background: #e7f6e7; color: #0a5d0a; }}
        .error {{ background: #ffe7e7; color: #c62828; }}
        .info {{ background: #e3f2fd; color: #0d47a1; margin-top: 20px; padding: 10px; }}
        .step {{ margin-bottom: 10px; padding: 10px; background: #fafafa; border-radius: 5px; }}
        code {{ background: #f5f5f5; padding: 2px 5px; font-family: monospace; word-break: break-all; }}
        @media (max-width: 480px) {{ body {{ padding: 10px; }} .container {{ padding: 15px; }} }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Database Server Status</h1>
        {body}
    </div>
</body>
</html>
"#
    )
}

pub struct StatusPage {
    db: Arc<DbFile>,
}

impl StatusPage {
    pub fn new(db: Arc<DbFile>) -> Self {
        Self { db }
    }
}

#[handler]
impl StatusPage {
    async fn handle(&self, req: &mut Request, res: &mut Response) {
        let url = format!("http://{}/{}", request_host(req), DOWNLOAD_NAME);
        let size = self.db.size().await;
        res.render(Text::Html(render_status_page(size, &url)));
    }
}

pub struct DbStatus {
    db: Arc<DbFile>,
}

impl DbStatus {
    pub fn new(db: Arc<DbFile>) -> Self {
        Self { db }
    }
}

#[handler]
impl DbStatus {
    async fn handle(&self, res: &mut Response) {
        match self.db.size().await {
            Some(size) => res.render(Json(json!({
                "status": "ok",
                "message": "Database file exists",
                "size": size,
            }))),
            None => {
                res.status_code(StatusCode::NOT_FOUND);
                res.render(Json(json!({
                    "status": "error",
                    "message": NOT_FOUND_MESSAGE,
                })));
            }
        }
    }
}

pub struct DbDownload {
    db: Arc<DbFile>,
}

impl DbDownload {
    pub fn new(db: Arc<DbFile>) -> Self {
        Self { db }
    }
}

#[handler]
impl DbDownload {
    async fn handle(&self, req: &mut Request, res: &mut Response) {
        if self.db.size().await.is_none() {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Text::Plain(NOT_FOUND_MESSAGE));
            return;
        }

        let mut builder = NamedFile::builder(self.db.path()).attached_name(DOWNLOAD_NAME);
        if let Ok(mime) = SQLITE_MIME.parse::<Mime>() {
            builder = builder.content_type(mime);
        }
        match builder.build().await {
            Ok(file) => file.send(req.headers(), res).await,
            Err(e) => {
                error!("failed to open {}: {}", self.db.path().display(), e);
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.render(Text::Plain("Failed to read database file"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::web::create_service;

    fn service_for(path: PathBuf) -> Service {
        create_service(Arc::new(DbFile::new(path)))
    }

    #[test]
    fn size_mb_rounds_to_two_decimals() {
        assert_eq!(size_mb(0), 0.0);
        assert_eq!(size_mb(1024 * 1024), 1.0);
        assert_eq!(size_mb(1_572_864), 1.5);
        assert_eq!(size_mb(1_234_567), 1.18);
    }

    #[test]
    fn status_page_mentions_download_url_only_when_present() {
        let present = render_status_page(Some(2 * 1024 * 1024), "http://example.org/sqlite.db");
        assert!(present.contains("Size: 2.00 MB"));
        assert!(present.contains("<code>http://example.org/sqlite.db</code>"));

        let absent = render_status_page(None, "http://example.org/sqlite.db");
        assert!(absent.contains("Database not found"));
        assert!(!absent.contains("example.org"));
    }

    #[tokio::test]
    async fn db_status_reports_size() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sqlite.db");
        std::fs::write(&path, vec![0u8; 2048]).expect("write db");

        let mut res = TestClient::get("http://127.0.0.1:5002/db-status")
            .send(&service_for(path))
            .await;
        let body: Value = res.take_json().await.expect("json body");

        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Database file exists");
        assert_eq!(body["size"], 2048);
    }

    #[tokio::test]
    async fn db_status_is_404_without_file() {
        let dir = TempDir::new().expect("temp dir");

        let mut res = TestClient::get("http://127.0.0.1:5002/db-status")
            .send(&service_for(dir.path().join("sqlite.db")))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        let body: Value = res.take_json().await.expect("json body");
        assert_eq!(body["status"], "error");
        assert!(body.get("size").is_none());
    }

    #[tokio::test]
    async fn download_serves_raw_bytes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sqlite.db");
        std::fs::write(&path, b"SQLite format 3\0").expect("write db");

        let mut res = TestClient::get("http://127.0.0.1:5002/sqlite.db")
            .send(&service_for(path))
            .await;

        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/x-sqlite3")
        );
        assert_eq!(
            res.headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"sqlite.db\"")
        );
        assert_eq!(res.take_string().await.expect("body"), "SQLite format 3\0");
    }

    #[tokio::test]
    async fn download_is_404_without_file() {
        let dir = TempDir::new().expect("temp dir");

        let mut res = TestClient::get("http://127.0.0.1:5002/sqlite.db")
            .send(&service_for(dir.path().join("sqlite.db")))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert_eq!(res.take_string().await.expect("body"), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn index_renders_status_page() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sqlite.db");
        std::fs::write(&path, b"data").expect("write db");

        let mut res = TestClient::get("http://127.0.0.1:5002/")
            .send(&service_for(path))
            .await;

        let page = res.take_string().await.expect("body");
        assert!(page.contains("Database Server Status"));
        assert!(page.contains("/sqlite.db</code>"));
    }

    #[tokio::test]
    async fn index_uses_a_valid_host_header() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sqlite.db");
        std::fs::write(&path, b"data").expect("write db");

        let mut res = TestClient::get("http://127.0.0.1:5002/")
            .add_header(header::HOST, "db.example.org:5002", true)
            .send(&service_for(path))
            .await;

        let page = res.take_string().await.expect("body");
        assert!(page.contains("<code>http://db.example.org:5002/sqlite.db</code>"));
    }

    #[tokio::test]
    async fn index_ignores_a_hostile_host_header() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("sqlite.db");
        std::fs::write(&path, b"data").expect("write db");

        let mut res = TestClient::get("http://127.0.0.1:5002/")
            .add_header(header::HOST, "evil\"><script>alert(1)</script>", true)
            .send(&service_for(path))
            .await;

        let page = res.take_string().await.expect("body");
        assert!(!page.contains("<script>"));
        assert!(!page.contains("evil"));
        assert!(page.contains("/sqlite.db</code>"));
    }
}
