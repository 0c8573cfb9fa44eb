#![allow(dead_code)]

// Shared fixtures for the integration tests: an in-process stub of the
// remote voiceprint service, plus scripted capture/confirmation seams.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use voiceprint_console::{
    AudioChunk, CaptureBackend, Confirm, EnrollRequest, EnrollResponse, IdentificationLogEntry,
    IdentificationResult, IdentifyRequest, Stats, VoiceprintRecord, WorkflowError,
};

/// In-process stand-in for the remote voiceprint service.
///
/// Records every request it receives so tests can assert exactly which
/// operations were (and were not) issued.
#[derive(Clone, Default)]
pub struct StubService {
    inner: Arc<StubInner>,
}

#[derive(Default)]
struct StubInner {
    hits: Mutex<Vec<String>>,
    enroll_requests: Mutex<Vec<EnrollRequest>>,
    identify_requests: Mutex<Vec<IdentifyRequest>>,
    records: Mutex<Vec<VoiceprintRecord>>,
    logs: Mutex<Vec<IdentificationLogEntry>>,
    stats: Mutex<Stats>,
    raw_stats: Mutex<Option<String>>,
    identify_result: Mutex<IdentificationResult>,
    fail_enroll: AtomicBool,
}

impl StubService {
    /// Bind to an ephemeral port and serve in the background. Returns the
    /// base URL to point an `ApiClient` at.
    pub async fn serve(&self) -> String {
        let router = Router::new()
            .route("/api/voiceprint/enroll", post(enroll))
            .route("/api/voiceprint/identify", post(identify))
            .route("/api/voiceprint/user/:user_id", get(list_by_user))
            .route("/api/voiceprint/:id", delete(delete_record))
            .route("/api/voiceprint/logs", get(list_logs))
            .route("/api/voiceprint/stats", get(get_stats))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve stub");
        });

        format!("http://{}", addr)
    }

    pub fn hits(&self) -> Vec<String> {
        self.inner.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, prefix: &str) -> usize {
        self.inner
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.starts_with(prefix))
            .count()
    }

    pub fn enroll_requests(&self) -> Vec<EnrollRequest> {
        self.inner.enroll_requests.lock().unwrap().clone()
    }

    pub fn identify_requests(&self) -> Vec<IdentifyRequest> {
        self.inner.identify_requests.lock().unwrap().clone()
    }

    pub fn set_records(&self, records: Vec<VoiceprintRecord>) {
        *self.inner.records.lock().unwrap() = records;
    }

    pub fn set_logs(&self, logs: Vec<IdentificationLogEntry>) {
        *self.inner.logs.lock().unwrap() = logs;
    }

    pub fn set_stats(&self, stats: Stats) {
        *self.inner.stats.lock().unwrap() = stats;
    }

    /// Serve this raw body from the stats endpoint instead of typed JSON.
    pub fn set_raw_stats(&self, body: impl Into<String>) {
        *self.inner.raw_stats.lock().unwrap() = Some(body.into());
    }

    pub fn set_identify_result(&self, result: IdentificationResult) {
        *self.inner.identify_result.lock().unwrap() = result;
    }

    /// Make the enroll endpoint answer HTTP 500 with body "db error".
    pub fn set_fail_enroll(&self, fail: bool) {
        self.inner.fail_enroll.store(fail, Ordering::SeqCst);
    }

    fn record_hit(&self, hit: String) {
        self.inner.hits.lock().unwrap().push(hit);
    }
}

async fn enroll(
    State(stub): State<StubService>,
    Json(req): Json<EnrollRequest>,
) -> Response {
    stub.record_hit("POST /api/voiceprint/enroll".to_string());
    stub.inner.enroll_requests.lock().unwrap().push(req);

    if stub.inner.fail_enroll.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "db error".to_string()).into_response();
    }

    Json(EnrollResponse {
        message: "ok".to_string(),
    })
    .into_response()
}

async fn identify(
    State(stub): State<StubService>,
    Json(req): Json<IdentifyRequest>,
) -> Response {
    stub.record_hit("POST /api/voiceprint/identify".to_string());
    stub.inner.identify_requests.lock().unwrap().push(req);

    let result = stub.inner.identify_result.lock().unwrap().clone();
    Json(result).into_response()
}

async fn list_by_user(State(stub): State<StubService>, Path(user_id): Path<String>) -> Response {
    stub.record_hit(format!("GET /api/voiceprint/user/{}", user_id));

    let records = stub.inner.records.lock().unwrap().clone();
    Json(records).into_response()
}

async fn delete_record(State(stub): State<StubService>, Path(id): Path<i64>) -> Response {
    stub.record_hit(format!("DELETE /api/voiceprint/{}", id));
    StatusCode::NO_CONTENT.into_response()
}

async fn list_logs(State(stub): State<StubService>) -> Response {
    stub.record_hit("GET /api/voiceprint/logs".to_string());

    let logs = stub.inner.logs.lock().unwrap().clone();
    Json(logs).into_response()
}

async fn get_stats(State(stub): State<StubService>) -> Response {
    stub.record_hit("GET /api/voiceprint/stats".to_string());

    if let Some(raw) = stub.inner.raw_stats.lock().unwrap().clone() {
        return ([(header::CONTENT_TYPE, "application/json")], raw).into_response();
    }

    let stats = *stub.inner.stats.lock().unwrap();
    Json(stats).into_response()
}

/// Capture backend with a pre-scripted chunk sequence.
pub struct ScriptedBackend {
    chunks: Vec<AudioChunk>,
    deny: bool,
    capturing: bool,
    released: Arc<AtomicBool>,
}

impl ScriptedBackend {
    pub fn with_chunks(chunks: Vec<AudioChunk>) -> Self {
        Self {
            chunks,
            deny: false,
            capturing: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A backend whose device grant always fails.
    pub fn denied() -> Self {
        Self {
            chunks: Vec::new(),
            deny: true,
            capturing: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once the device has been released (stop or drop).
    pub fn released_flag(&self) -> Arc<AtomicBool> {
        self.released.clone()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> voiceprint_console::Result<mpsc::UnboundedReceiver<AudioChunk>> {
        if self.deny {
            return Err(WorkflowError::DeviceAccess(
                "microphone denied".to_string(),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        for chunk in self.chunks.drain(..) {
            let _ = tx.send(chunk);
        }
        self.capturing = true;
        Ok(rx)
    }

    async fn stop(&mut self) -> voiceprint_console::Result<()> {
        self.capturing = false;
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl Drop for ScriptedBackend {
    fn drop(&mut self) {
        if self.capturing {
            self.released.store(true, Ordering::SeqCst);
        }
    }
}

/// Confirmation seam with a fixed answer; records every prompt it was shown.
pub struct ScriptedConfirm {
    pub answer: bool,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answer
    }
}

/// Generate `frames` chunks of 100ms of 16kHz mono audio with recognizable
/// sample values.
pub fn tone_chunks(frames: usize) -> Vec<AudioChunk> {
    (0..frames)
        .map(|i| AudioChunk {
            samples: vec![(i % 100) as i16; 1600],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: (i as u64) * 100,
        })
        .collect()
}
