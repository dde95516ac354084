//! Shared fixtures for infra integration tests

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use studyarc_core::{AuthReader, CallMetricsSink};
use studyarc_domain::{ApiConfig, CallRecord, Result, StudyArcError};
use studyarc_infra::gateway::Gateway;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink that keeps every record for inspection
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<CallRecord>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<CallRecord> {
        self.records.lock().clone()
    }
}

impl CallMetricsSink for RecordingSink {
    fn record_call(&self, record: &CallRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Sink that rejects every record, counting the attempts
#[derive(Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

impl CallMetricsSink for FailingSink {
    fn record_call(&self, _record: &CallRecord) -> Result<()> {
        *self.attempts.lock() += 1;
        Err(StudyArcError::Internal("metrics backend unavailable".into()))
    }
}

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig { base_url: server.uri(), ..ApiConfig::default() }
}

pub fn gateway(server: &MockServer, auth: AuthReader, sink: Arc<dyn CallMetricsSink>) -> Gateway {
    Gateway::new(&api_config(server), auth, sink).expect("gateway should build")
}

/// `{success: true, data}` response
pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

pub async fn mount_get(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET")).and(path(endpoint)).respond_with(response).mount(server).await;
}

pub async fn mount_post(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("POST")).and(path(endpoint)).respond_with(response).mount(server).await;
}

/// Requests the server received for `endpoint`
pub async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == endpoint)
        .collect()
}

pub fn authorization(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn study_logs_json() -> Value {
    json!([
        {
            "id": "l1",
            "subject": "math",
            "durationMinutes": 45,
            "studiedAt": "2024-03-01T08:00:00Z"
        },
        {
            "id": "l2",
            "subject": "english",
            "durationMinutes": 20,
            "studiedAt": "2024-03-02T08:00:00Z"
        }
    ])
}

pub fn statistics_json() -> Value {
    json!({
        "totalStudyMinutes": 65,
        "sessionsCompleted": 2,
        "averageScore": 78.5,
        "currentStreakDays": 2
    })
}

pub fn review_items_json() -> Value {
    json!([{
        "id": "r1",
        "questionId": "q-7",
        "subject": "science",
        "dueAt": "2024-03-03T00:00:00Z",
        "intervalDays": 3,
        "easeFactor": 2.5,
        "repetitions": 2
    }])
}

pub fn questions_json(count: usize) -> Value {
    Value::Array(
        (1..=count)
            .map(|n| {
                json!({
                    "id": format!("q-{n}"),
                    "prompt": format!("Question {n}"),
                    "choices": ["a", "b"]
                })
            })
            .collect(),
    )
}
