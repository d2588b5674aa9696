use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use axum::routing::get;
use axum::Router;
use predicates::str::contains;
use tempfile::TempDir;
use tokio::task::JoinHandle;

const FEEDS: [&str; 5] = [
    "price.json",
    "flavor.json",
    "databaseAvaibility.json",
    "databaseCapabilities.json",
    "database-price.json",
];

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../catalog/tests/fixtures")
}

/// Serves the catalog fixtures the way the vendor serves its feeds.
struct FeedServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FeedServer {
    async fn launch() -> Self {
        let mut app = Router::new();
        for feed in FEEDS {
            let body = std::fs::read_to_string(fixtures().join(feed)).unwrap();
            app = app.route(
                &format!("/cloud/{feed}"),
                get(move || async move { ([("content-type", "application/json")], body) }),
            );
        }
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, handle }
    }

    fn url(&self) -> String {
        format!("http://{}/cloud", self.addr)
    }
}

impl Drop for FeedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn ovhcat(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ovhcat").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd.env("OVHCAT_STORE", dir.path().join("catalog.json"));
    cmd.env("OVHCAT_LOG_DIR", dir.path().join("logs"));
    cmd.timeout(std::time::Duration::from_secs(60));
    cmd
}

async fn run(mut cmd: Command) -> Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn config_prints_effective_values() {
    let dir = TempDir::new().unwrap();
    ovhcat(&dir)
        .env("OVHCAT_REGIONS", "gra.*")
        .arg("config")
        .assert()
        .success()
        .stdout(contains("\"node\": \"service:prov:ovh\""))
        .stdout(contains("\"regions\": \"gra.*\""));
}

#[test]
fn status_of_empty_store() {
    let dir = TempDir::new().unwrap();
    ovhcat(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("No catalog stored in"));
}

#[test]
fn invalid_pattern_fails_before_fetch() {
    let dir = TempDir::new().unwrap();
    ovhcat(&dir)
        .args(["install", "--regions", "[", "--prices-url", "http://127.0.0.1:9/cloud"])
        .assert()
        .failure()
        .stderr(contains("invalid regions pattern"));
    assert!(!dir.path().join("catalog.json").exists());
}

#[tokio::test]
async fn install_twice_against_feed_server() {
    let server = FeedServer::launch().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = ovhcat(&dir);
    cmd.args(["install", "--prices-url", &server.url()]);
    run(cmd)
        .await
        .success()
        .stdout(contains("Import finished"))
        .stdout(contains("[6/6] install-support"));

    let stored = std::fs::read_to_string(dir.path().join("catalog.json")).unwrap();
    assert!(stored.contains("linux/gra7/consumption/b2-7"));

    let mut cmd = ovhcat(&dir);
    cmd.args(["install", "--prices-url", &server.url()]);
    run(cmd)
        .await
        .success()
        .stdout(contains("Changed entities   0"));

    let mut cmd = ovhcat(&dir);
    cmd.args(["status", "--json"]);
    run(cmd)
        .await
        .success()
        .stdout(contains("\"service:prov:ovh\""))
        .stdout(contains("\"instance\": 11"));
}
