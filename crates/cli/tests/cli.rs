use assert_cmd::Command;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use predicates::prelude::*;
use std::collections::HashMap;
use std::net::SocketAddr;

fn entity(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "repo": format!("https://github.com/example/{id}"),
        "summary": format!("{name} layer"),
        "owner": ["alice"]
    })
}

async fn list_layers(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let all = vec![entity("1", "telemetry"), entity("2", "logging")];
    let filtered = match params.get("q") {
        Some(q) => all
            .into_iter()
            .filter(|e| e["name"].as_str().unwrap().contains(q.as_str()))
            .collect(),
        None => all,
    };
    Json(serde_json::Value::Array(filtered))
}

async fn show_repo(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
    if id == "1" {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "readme": "# telemetry layer",
                "rules": [{"path": "ingest.rules", "content": {"interval": 60}}],
                "schema": [{"path": "metrics.schema", "content": {"type": "object"}}]
            })),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(serde_json::json!("no such repo")))
    }
}

async fn delete_layer(Path(id): Path<String>) -> (StatusCode, String) {
    if id == "2" {
        (StatusCode::CONFLICT, "locked".to_string())
    } else {
        (StatusCode::OK, "OK".to_string())
    }
}

/// Binds a stub catalog on an ephemeral port; it keeps serving as long as
/// the runtime is alive.
fn start_stub(rt: &tokio::runtime::Runtime) -> SocketAddr {
    rt.block_on(async {
        let app = Router::new()
            .route("/api/v2/layers/", get(list_layers))
            .route("/api/v2/layers/:id/", delete(delete_layer))
            .route("/api/v2/repos/:id/", get(show_repo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    })
}

fn layerdeck(base: &str) -> Command {
    let mut cmd = Command::cargo_bin("layerdeck").expect("binary");
    cmd.args(["--base-url", base]);
    cmd
}

#[test]
fn list_show_and_delete_against_a_stub_catalog() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let base = format!("http://{}", start_stub(&rt));

    layerdeck(&base).arg("list").assert().success().stdout(
        predicate::str::contains("telemetry").and(predicate::str::contains("logging")),
    );

    layerdeck(&base)
        .args(["list", "--query", "tele"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("telemetry").and(predicate::str::contains("logging").not()),
        );

    layerdeck(&base)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("# telemetry layer")
                .and(predicate::str::contains("metrics.schema")),
        );

    layerdeck(&base)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    // rejection surfaces the server body verbatim and exits non-zero
    layerdeck(&base)
        .args(["delete", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));
}

#[test]
fn browse_session_lists_rows() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let base = format!("http://{}", start_stub(&rt));

    layerdeck(&base)
        .arg("browse")
        .write_stdin("refresh\nrows\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("telemetry").and(predicate::str::contains("logging")));
}

#[test]
fn urls_prints_navigation_targets() {
    layerdeck("http://example.test")
        .args(["urls", "7"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://example.test/layer/7/")
                .and(predicate::str::contains("/editor/layers/+/")),
        );
}
