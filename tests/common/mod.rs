#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use debts_api::store::{MemoryStore, RecordStore};
use debts_api::{app, AppState};

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/db.json")
}

/// Router over a fresh copy of the fixture store, driven in-process with `oneshot`.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let store = Arc::new(MemoryStore::load(fixture_path()).await?);
        let router = app(AppState { store: store.clone() }, &[]);
        Ok(Self { router, store })
    }

    /// App over any store, for failure-path tests.
    pub fn with_store(store: impl RecordStore + 'static) -> Router {
        app(AppState::new(store), &[])
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        send(&self.router, Request::get(path).body(Body::empty())?).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(&self.router, json_request(path, &body)?).await
    }

    pub async fn request(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        send(&self.router, request).await
    }

    /// Current stage of the debt row owned by `account_id`.
    pub async fn stage_of(&self, account_id: i64) -> Option<Value> {
        self.store
            .rows("debt")
            .await?
            .into_iter()
            .find(|row| row.get("account_id") == Some(&Value::from(account_id)))
            .and_then(|row| row.get("stage").cloned())
    }
}

pub fn json_request(path: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?)
}

pub async fn send(router: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

/// Account ids of a listing response, in order.
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["id"].as_i64()).collect())
        .unwrap_or_default()
}

pub fn row_indexes(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["rowIndex"].as_i64()).collect())
        .unwrap_or_default()
}

/// The built binary running in mock mode on a free port; killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn spawn_mock(fixture: &std::path::Path) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_debts-api"))
            .args(["mock", "--db"])
            .arg(fixture)
            .arg("--port")
            .arg(port.to_string())
            .env("HOST", "127.0.0.1")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
