//! In-process HTTP stub of the reporting service, plus sample payloads.

use crate::cloud::types::*;
use crate::environment::Environment;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Clone)]
struct StubReply {
    status: u16,
    body: String,
}

type Routes = Arc<Mutex<HashMap<(String, String), VecDeque<StubReply>>>>;

/// Replies are queued per `(method, path)` and consumed in order; unmatched requests get a 404.
pub struct StubServer {
    base_url: String,
    routes: Routes,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (r, q) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (r, q) = (r.clone(), q.clone());
                tokio::spawn(async move {
                    let _ = handle_connection(stream, r, q).await;
                });
            }
        });

        Self { base_url: format!("http://{}", addr), routes, requests }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.base_url.clone())
    }

    pub async fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
        self.reply_raw(method, path, status, &body.to_string()).await;
    }

    pub async fn reply_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .await
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(StubReply { status, body: body.to_string() });
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

async fn handle_connection(
    stream: TcpStream,
    routes: Routes,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<(), String> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.map_err(|e| e.to_string())?;
    if request_line.is_empty() {
        return Ok(());
    }

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.map_err(|e| e.to_string())?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().unwrap_or(0);
            }
        }
    }

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let method = parts.first().copied().unwrap_or("").to_string();
    let path = parts.get(1).copied().unwrap_or("/").to_string();

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await.map_err(|e| e.to_string())?;
    }
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    requests.lock().await.push(RecordedRequest { method: method.clone(), path: path.clone(), body });

    let reply = routes
        .lock()
        .await
        .get_mut(&(method, path))
        .and_then(|queue| queue.pop_front())
        .unwrap_or(StubReply { status: 404, body: String::new() });

    let reason = reqwest::StatusCode::from_u16(reply.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason,
        reply.body.len(),
        reply.body
    );
    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await.map_err(|e| e.to_string())?;
    stream.shutdown().await.map_err(|e| e.to_string())
}

pub fn sample_platform() -> Platform {
    Platform {
        os_name: "linux".to_string(),
        os_version: "Debian - 10.5".to_string(),
        browser_name: "chrome".to_string(),
        browser_version: "6.4.7".to_string(),
    }
}

pub fn sample_run_payload() -> CreateRunPayload {
    CreateRunPayload {
        ci: CiInfo { params: json!({ "foo": "bar" }), provider: None },
        ci_build_id: Some("ci-build-id".to_string()),
        project_id: "project-1".to_string(),
        record_key: "token-1".to_string(),
        commit: CommitInfo {
            sha: Some("sha".to_string()),
            branch: Some("main".to_string()),
            author_name: Some("john".to_string()),
            author_email: Some("john@currents.dev".to_string()),
            message: Some("msg".to_string()),
            remote_origin: Some("https://github.com/foo/bar.git".to_string()),
            default_branch: None,
        },
        specs: vec!["foo.js".to_string(), "bar.js".to_string()],
        group: Some("group-1".to_string()),
        platform: sample_platform(),
        parallel: true,
        spec_pattern: vec![],
        tags: vec![],
        testing_type: TestingType::E2e,
        batch_size: None,
    }
}

pub fn sample_run_response() -> Value {
    json!({
        "warnings": [],
        "groupId": "groupId1",
        "machineId": "machineId1",
        "runId": "runId1",
        "runUrl": "runUrl1",
        "isNewRun": true,
    })
}

pub fn sample_results_payload() -> UpdateInstanceResultsPayload {
    UpdateInstanceResultsPayload {
        stats: InstanceStats {
            suites: 1,
            tests: 2,
            passes: 1,
            pending: 1,
            skipped: 0,
            failures: 0,
            wall_clock_started_at: Some("2022-12-11T08:46:31.881Z".to_string()),
            wall_clock_ended_at: Some("2022-12-11T08:46:50.519Z".to_string()),
            wall_clock_duration: Some(18638),
        },
        tests: vec![
            TestResult {
                client_id: "r3".to_string(),
                state: TestState::Pending,
                display_error: None,
                attempts: vec![TestAttempt {
                    state: TestState::Pending,
                    error: None,
                    wall_clock_started_at: None,
                    wall_clock_duration: None,
                    video_timestamp: None,
                }],
            },
            TestResult {
                client_id: "r4".to_string(),
                state: TestState::Passed,
                display_error: None,
                attempts: vec![TestAttempt {
                    state: TestState::Passed,
                    error: None,
                    wall_clock_started_at: Some("2022-12-11T08:46:31.893Z".to_string()),
                    wall_clock_duration: Some(18625),
                    video_timestamp: Some(1172),
                }],
            },
        ],
        exception: None,
        video: false,
        screenshots: vec![],
        reporter_stats: Some(ReporterStats {
            suites: 1,
            tests: 1,
            passes: 1,
            pending: 1,
            failures: 0,
            start: Some("2022-12-11T08:46:31.884Z".to_string()),
            end: Some("2022-12-11T08:46:50.535Z".to_string()),
            duration: Some(18651),
        }),
    }
}
