//! End-to-end tests for the tumblr-get binary against a mock API

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestEnv {
    _temp_dir: TempDir,
    config_path: PathBuf,
    cred_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let cred_path = temp_dir.path().join("tumblr.conf.json");

        fs::write(
            &config_path,
            format!(
                "[credentials]\npath = \"{}\"\n",
                cred_path.to_string_lossy().replace('\\', "\\\\")
            ),
        )
        .unwrap();
        fs::write(
            &cred_path,
            r#"{"oauth_key": "ck", "oauth_key_sec": "cs", "oauth_token": "t", "oauth_token_sec": "ts"}"#,
        )
        .unwrap();

        Self {
            _temp_dir: temp_dir,
            config_path,
            cred_path,
        }
    }

    fn cmd(&self, server: &MockServer) -> Command {
        let mut cmd = Command::cargo_bin("tumblr-get").unwrap();
        cmd.env("TUMBLR_CONFIG", &self.config_path);
        cmd.arg("--base-url").arg(server.uri());
        cmd
    }
}

async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> serde_json::Value {
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_info_prints_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/info"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "blog": { "name": "staff" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let mut cmd = env.cmd(&server);
    cmd.args(["info", "staff"]);
    let assert = run(cmd).await.success();

    let envelope = stdout_json(&assert);
    assert_eq!(envelope["request"], "v2/blog/staff.tumblr.com/info");
    assert_eq!(envelope["meta"]["status"], 200);
    assert_eq!(envelope["errors"], json!([{ "null": null }]));
    assert_eq!(envelope["response"]["blog"]["name"], "staff");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_likes_flags_become_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/user/likes/"))
        .and(query_param("limit", "3"))
        .and(query_param("before", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "liked_posts": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let mut cmd = env.cmd(&server);
    cmd.args(["likes", "--limit", "3", "--before", "1700000000"]);
    let assert = run(cmd).await.success();

    assert_eq!(
        stdout_json(&assert)["request"],
        "v2/user/likes/?limit=3&before=1700000000"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_posts_type_and_notes_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/blog/staff.tumblr.com/posts/photo/"))
        .and(query_param("notes_info", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "posts": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let mut cmd = env.cmd(&server);
    cmd.args(["posts", "staff", "--type", "photo", "--notes-info"]);
    run(cmd).await.success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_explicit_file_overrides_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/user/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "status": 200, "msg": "OK" },
            "response": { "posts": [] }
        })))
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let other = env.cred_path.with_file_name("other.json");
    fs::write(&other, r#"{"oauth_key": "other-ck", "oauth_key_sec": "cs"}"#).unwrap();

    let mut cmd = env.cmd(&server);
    cmd.arg("--file").arg(&other).arg("dashboard");
    run(cmd).await.success();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth.contains("oauth_consumer_key=\"other-ck\""));
    assert!(!auth.contains("oauth_token="));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_credentials_exit_code() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    fs::write(&env.cred_path, r#"{"oauth_key": "ck", "oauth_token": "t", "oauth_token_sec": "ts"}"#)
        .unwrap();

    let mut cmd = env.cmd(&server);
    cmd.arg("dashboard");
    run(cmd)
        .await
        .code(2)
        .stdout(predicate::str::is_empty());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_json_reply_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let mut cmd = env.cmd(&server);
    cmd.args(["following"]);
    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("Failed to decode response"));
}
