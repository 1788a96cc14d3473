use serde_json::Value;
use std::fs;
use wiremock::matchers::{body_string, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{render_template, reqpad_cmd, write_collection};

fn run_json(args: &[&str]) -> (std::process::Output, Value) {
    let output = reqpad_cmd()
        .args(args)
        .args(["-o", "json"])
        .output()
        .expect("Failed to execute reqpad binary");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{stdout}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output, json)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_sends_global_authorization_over_local() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(header("Authorization", "Bearer global-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 42,
            "name": "Ada"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "global_auth",
        &render_template("get_user.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "-n", "Get User"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let result = &json["results"][0];
    assert_eq!(result["request_name"], "Get User");
    assert_eq!(result["status"]["code"], 200);
    assert_eq!(result["status"]["text"], "OK");
    assert_eq!(result["response"]["name"], "Ada");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_default_command_runs_active_request_with_cli_override() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "default_command",
        &render_template("get_user.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["-s", &source, "-v", "userId=7"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["results"][0]["response"], "plain text");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_all_treats_http_errors_as_completed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 42})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"{"error": "not here"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "run_all",
        &render_template("get_user.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "--all"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let results = json["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["request_name"], "Missing");
    assert_eq!(results[1]["status"]["code"], 404);
    assert_eq!(results[1]["status"]["text"], "Not Found");
    assert_eq!(results[1]["response"]["error"], "not here");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_json_body_is_resolved_and_sent_verbatim() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"title": "hello"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 101})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "json_body",
        &render_template("bodies.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "-n", "Create Post"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["results"][0]["status"]["code"], 201);
    assert_eq!(json["results"][0]["response"]["id"], 101);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_url_encoded_body_skips_empty_keys() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("user=hello&note=a+b"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "url_encoded",
        &render_template("bodies.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "-n", "Login Form"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["results"][0]["status"]["code"], 204);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_multipart_uploads_file_with_generated_boundary() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("Content-Type", "^multipart/form-data; boundary=.+"))
        .and(body_string_contains("name=\"caption\""))
        .and(body_string_contains("filename=\"upload.txt\""))
        .and(body_string_contains("upload-contents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "multipart",
        &render_template("bodies.json.template", &mock_server.uri()),
    );
    fs::write(dir.join("upload.txt"), "upload-contents").unwrap();
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "-n", "Upload"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["results"][0]["response"], "stored");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_all_missing_attachment_fails_only_that_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    // No upload.txt next to the collection.
    let dir = write_collection(
        "missing_attachment",
        &render_template("bodies.json.template", &mock_server.uri()),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source, "--all"]);

    assert_eq!(output.status.code(), Some(6));
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["status"]["code"], 201);
    assert_eq!(results[1]["status"]["code"], 204);
    assert_eq!(results[2]["request_name"], "Upload");
    assert_eq!(results[2]["status"]["code"], "Error");
    assert_eq!(results[2]["status"]["text"], "Fail");
    assert!(results[2]["response"]["error"]
        .as_str()
        .is_some_and(|e| e.contains("upload.txt")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_secrets_from_dotenv_and_os() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(header("Authorization", "Bearer from-os"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = write_collection(
        "secrets",
        &render_template("get_user.json.template", &mock_server.uri()),
    );
    fs::write(dir.join(".env"), "token=from-dotenv\n").unwrap();
    let source = dir.to_string_lossy().to_string();
    let output = reqpad_cmd()
        .args(["request", "run", "-s", &source, "-n", "Get User"])
        .env("REQPAD__token", "from-os")
        .output()
        .expect("Failed to execute reqpad binary");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("code: 200"), "unexpected output:\n{stdout}");
}

#[test]
fn test_run_unreachable_host_settles_as_error() {
    let dir = write_collection(
        "unreachable",
        &render_template("unreachable.json.template", ""),
    );
    let source = dir.to_string_lossy().to_string();
    let (output, json) = run_json(&["request", "run", "-s", &source]);

    assert_eq!(output.status.code(), Some(6));
    let result = &json["results"][0];
    assert_eq!(result["status"]["code"], "Error");
    assert_eq!(result["status"]["text"], "Fail");
    assert_eq!(result["status"]["timeMs"], 0);
    assert!(result["response"]["error"]
        .as_str()
        .is_some_and(|e| !e.is_empty()));
}

#[test]
fn test_run_unknown_request_name() {
    let output = reqpad_cmd()
        .args([
            "request",
            "run",
            "-s",
            "tests/fixtures/collections/basic",
            "-n",
            "Nope",
        ])
        .output()
        .expect("Failed to execute reqpad binary");

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Request not found: Nope"), "stderr: {stderr}");
}

#[test]
fn test_run_invalid_variable_format() {
    let output = reqpad_cmd()
        .args([
            "request",
            "run",
            "-s",
            "tests/fixtures/collections/basic",
            "-v",
            "userId",
        ])
        .output()
        .expect("Failed to execute reqpad binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NAME=VALUE"), "stderr: {stderr}");
}

#[test]
fn test_run_missing_source() {
    let output = reqpad_cmd()
        .args(["request", "run", "-s", "tests/fixtures/does-not-exist"])
        .output()
        .expect("Failed to execute reqpad binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Path does not exist"), "stderr: {stderr}");
}
