use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("tempfile");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

fn failover() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("failover"));
    cmd.env_remove("FAILOVER_BASE_URL")
        .env_remove("FAILOVER_TOKEN")
        .env_remove("FAILOVER_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

/// Minimal HTTP/1.1 responder on a background thread. Returns the base URL
/// and a log of `METHOD /path body` lines.
fn serve<F>(route: F) -> (String, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str, &str) -> (u16, String) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = log.clone();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);

            seen.lock()
                .unwrap()
                .push(format!("{method} {path} {}", String::from_utf8_lossy(&body)).trim().to_string());

            let (status, payload) = route(&method, &path);
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    (format!("http://{addr}"), log)
}

const VALID_DOC: &str = r#"
failover: 1.0.0
operations:
  - operationId: closeTicket
    retry:
      maxRetriesPerStrategy: 1
    strategies:
      - name: patch-ticket
        method: PATCH
        path: /tickets/{ticketId}
        body: { status: closed }
      - name: post-close
        method: POST
        path: /tickets/{ticketId}/close
"#;

#[test]
fn validate_command_returns_0_for_valid_doc() {
    let f = write_temp(VALID_DOC);
    failover()
        .args(["validate", f.path().to_string_lossy().as_ref()])
        .assert()
        .success();
}

#[test]
fn validate_command_returns_2_for_operation_without_strategies() {
    let f = write_temp(
        r#"
failover: 1.0.0
operations:
  - operationId: unassign
    strategies: []
"#,
    );
    let out = failover()
        .args(["validate", f.path().to_string_lossy().as_ref(), "--format", "json"])
        .output()
        .expect("run");

    assert_eq!(out.status.code(), Some(2));
    let json = stdout_json(&out);
    assert_eq!(json["valid"], false);
    assert!(json["errors"][0]
        .as_str()
        .unwrap()
        .contains("operations[0].strategies"));
}

#[test]
fn validate_command_returns_2_for_unknown_version() {
    let f = write_temp(&VALID_DOC.replace("1.0.0", "2.0.0"));
    failover()
        .args(["validate", f.path().to_string_lossy().as_ref()])
        .assert()
        .code(2);
}

#[test]
fn operations_lists_builtin_unassign() {
    let out = failover()
        .args(["operations", "--format", "json"])
        .output()
        .expect("run");

    assert!(out.status.success());
    let json = stdout_json(&out);
    assert_eq!(json["source"], "built-in");
    assert_eq!(json["operations"][0]["operation_id"], "unassignTechnician");
    assert_eq!(
        json["operations"][0]["strategies"],
        serde_json::json!([
            "delete-assignment",
            "post-unassign-action",
            "patch-clear-location",
            "post-collection-unassign"
        ])
    );
}

#[test]
fn plan_shows_default_schedule_and_rendered_paths() {
    let out = failover()
        .args([
            "plan",
            "--set",
            "technicianId=t 1",
            "--set",
            "locationId=l-2",
            "--max-attempts",
            "3",
            "--format",
            "json",
        ])
        .output()
        .expect("run");

    assert!(out.status.success());
    let json = stdout_json(&out);
    let op = &json["operations"][0];
    assert_eq!(json["rendered"], true);
    assert_eq!(op["max_attempts_per_strategy"], 3);
    assert_eq!(op["backoff_ms"], serde_json::json!([400, 800]));
    assert_eq!(op["strategies"][0]["path"], "/api/locations/l-2/technicians/t%201");
    assert_eq!(op["strategies"][0]["non_retryable"], serde_json::json!([400, 404, 405]));
    assert_eq!(op["verify"]["select"], "$.assignedLocation");
}

#[test]
fn plan_reports_missing_variables() {
    failover()
        .args(["plan", "--set", "technicianId=t1"])
        .assert()
        .code(2);
}

#[test]
fn run_without_base_url_is_a_runtime_error() {
    let f = write_temp(VALID_DOC);
    failover()
        .args([
            "run",
            f.path().to_string_lossy().as_ref(),
            "closeTicket",
            "--set",
            "ticketId=9",
        ])
        .assert()
        .code(4);
}

#[test]
fn unassign_falls_back_to_a_supported_shape() {
    let (base_url, log) = serve(|method, path| match (method, path) {
        ("POST", "/api/locations/loc-1/unassign-technician") => (200, r#"{"ok":true}"#.to_string()),
        ("GET", "/api/technicians/tech-1") => (200, r#"{"id":"tech-1","assignedLocation":null}"#.to_string()),
        _ => (405, String::new()),
    });

    let out = failover()
        .env("FAILOVER_TOKEN", "tok")
        .args([
            "unassign",
            "--technician",
            "tech-1",
            "--location",
            "loc-1",
            "--base-url",
            &base_url,
            "--events",
            "none",
            "--metrics",
            "--format",
            "json",
        ])
        .output()
        .expect("run");

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["strategy"], "post-unassign-action");
    assert_eq!(json["data"]["ok"], true);
    assert_eq!(json["metrics"]["strategies"]["fallbacks"], 1);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "DELETE /api/locations/loc-1/technicians/tech-1".to_string(),
            r#"POST /api/locations/loc-1/unassign-technician {"technicianId":"tech-1"}"#.to_string(),
            "GET /api/technicians/tech-1".to_string(),
        ]
    );
}

#[test]
fn run_exhausting_every_strategy_exits_3() {
    let (base_url, log) = serve(|_, _| (404, r#"{"error":"no route"}"#.to_string()));
    let f = write_temp(VALID_DOC);

    let out = failover()
        .args([
            "run",
            f.path().to_string_lossy().as_ref(),
            "closeTicket",
            "--set",
            "ticketId=9",
            "--base-url",
            &base_url,
            "--events",
            "none",
            "--format",
            "json",
        ])
        .output()
        .expect("run");

    assert_eq!(out.status.code(), Some(3));
    let json = stdout_json(&out);
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error_kind"], "exhausted");
    assert!(json["error"].as_str().unwrap().contains("patch-ticket, post-close"));
    assert_eq!(json["attempts"].as_array().unwrap().len(), 2);
    assert_eq!(log.lock().unwrap().len(), 2);
}

fn unassign_backend() -> (String, Arc<Mutex<Vec<String>>>) {
    serve(|method, path| match (method, path) {
        ("DELETE", "/api/locations/loc-1/technicians/tech-1") => (204, String::new()),
        ("GET", "/api/technicians/tech-1") => {
            (200, r#"{"id":"tech-1","assignedLocation":null}"#.to_string())
        }
        ("POST", "/hook") => (202, String::new()),
        _ => (404, String::new()),
    })
}

#[test]
fn webhook_receives_final_outcome_before_exit() {
    let (base_url, log) = unassign_backend();
    let hook = format!("{base_url}/hook");

    failover()
        .args([
            "unassign",
            "--technician",
            "tech-1",
            "--location",
            "loc-1",
            "--base-url",
            &base_url,
            "--events",
            "none",
            "--webhook-url",
            &hook,
        ])
        .assert()
        .success();

    let posted: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with("POST /hook"))
        .cloned()
        .collect();
    assert_eq!(posted.len(), 2, "{posted:?}");
    assert!(posted[0].contains(r#""operation":"unassignTechnician.verify""#));
    let last = &posted[1];
    assert!(last.contains(r#""type":"operation.succeeded""#), "{last}");
    assert!(last.contains(r#""operation":"unassignTechnician""#), "{last}");
    assert!(last.contains(r#""strategy":"delete-assignment""#), "{last}");
}

#[test]
fn stdout_events_move_to_stderr_under_json_format() {
    let (base_url, _) = unassign_backend();

    let out = failover()
        .args([
            "unassign",
            "--technician",
            "tech-1",
            "--location",
            "loc-1",
            "--base-url",
            &base_url,
            "--events",
            "stdout",
            "--format",
            "json",
        ])
        .output()
        .expect("run");

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let json = stdout_json(&out);
    assert_eq!(json["status"], "succeeded");

    let stderr = String::from_utf8_lossy(&out.stderr);
    let events: Vec<serde_json::Value> = stderr
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    assert_eq!(events.first().unwrap()["type"], "operation.started");
    assert_eq!(events.last().unwrap()["type"], "operation.succeeded");
    assert_eq!(events.last().unwrap()["operation"], "unassignTechnician");
}
