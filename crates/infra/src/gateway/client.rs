//! Gateway to the study service
//!
//! Every call takes a fresh [`AuthSnapshot`], attaches the bearer token when
//! there is a real one, decodes the response envelope and reports the call
//! to the metrics sink before the result is handed back.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use studyarc_core::{AuthReader, AuthSnapshot, CallMetricsSink, NoopCallMetrics};
use studyarc_domain::{ApiConfig, CallRecord, Result, StudyArcError, REQUEST_ID_HEADER};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::envelope;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Method, body and query of one gateway call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method
    pub method: Method,
    /// JSON body, if any
    pub body: Option<Value>,
    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Plain GET
    pub fn get() -> Self {
        Self::with_method(Method::GET)
    }

    /// Plain DELETE
    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    /// # Errors
    /// Returns `StudyArcError::Internal` if `body` cannot be serialized.
    pub fn post<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        Self::with_method(Method::POST).json(body)
    }

    /// # Errors
    /// Returns `StudyArcError::Internal` if `body` cannot be serialized.
    pub fn put<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        Self::with_method(Method::PUT).json(body)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn with_method(method: Method) -> Self {
        Self { method, body: None, query: Vec::new() }
    }

    fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|err| {
            StudyArcError::Internal(format!("Failed to serialize request body: {err}"))
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Remote service gateway
pub struct Gateway {
    http: HttpClient,
    base_url: String,
    auth: AuthReader,
    metrics: Arc<dyn CallMetricsSink>,
    verbose: bool,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("base_url", &self.base_url)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Build a gateway from configuration
    ///
    /// # Errors
    /// Returns `StudyArcError::Config` if the base URL is invalid, or the
    /// HTTP client error if it cannot be built.
    pub fn new(
        config: &ApiConfig,
        auth: AuthReader,
        metrics: Arc<dyn CallMetricsSink>,
    ) -> Result<Self> {
        url::Url::parse(&config.base_url).map_err(|err| {
            StudyArcError::Config(format!("Invalid API base URL '{}': {err}", config.base_url))
        })?;

        let http = HttpClient::builder()
            .timeout(config.timeout())
            .max_attempts(config.max_get_attempts)
            .build()?;

        Ok(Self::with_client(http, config, auth, metrics))
    }

    /// Build a gateway around an existing HTTP client
    pub fn with_client(
        http: HttpClient,
        config: &ApiConfig,
        auth: AuthReader,
        metrics: Arc<dyn CallMetricsSink>,
    ) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            metrics,
            verbose: config.verbose,
        }
    }

    /// Anonymous gateway that reports nowhere, for tooling and tests
    ///
    /// # Errors
    /// See [`Gateway::new`].
    pub fn anonymous(config: &ApiConfig) -> Result<Self> {
        Self::new(config, AuthReader::anonymous(), Arc::new(NoopCallMetrics))
    }

    /// Base URL endpoint paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential view the next call would use
    pub fn auth_snapshot(&self) -> AuthSnapshot {
        self.auth.snapshot()
    }

    /// GET `endpoint` and decode its payload
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.call(endpoint, RequestOptions::get()).await
    }

    /// POST `body` as JSON to `endpoint`
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(endpoint, RequestOptions::post(body)?).await
    }

    /// PUT `body` as JSON to `endpoint`
    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(endpoint, RequestOptions::put(body)?).await
    }

    /// DELETE `endpoint`
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.call(endpoint, RequestOptions::delete()).await
    }

    /// Perform one call against `endpoint` (a path relative to the base URL).
    ///
    /// # Errors
    /// - `Network` when no response was received
    /// - `Http` for non-2xx responses
    /// - `Application` for `{success: false}` or an undecodable payload
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let method = options.method.clone();
        let started = Instant::now();

        let (status, result) = self.execute(endpoint, options).await;

        let record = CallRecord {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            duration: started.elapsed(),
            status,
            error: result.as_ref().err().map(ToString::to_string),
        };
        if let Err(err) = self.metrics.record_call(&record) {
            warn!(endpoint, error = %err, "failed to record call metrics");
        }

        if self.verbose {
            match &result {
                Ok(_) => debug!(
                    endpoint,
                    %method,
                    ?status,
                    elapsed_ms = record.duration_ms(),
                    "call succeeded"
                ),
                Err(err) => debug!(endpoint, %method, ?status, error = %err, "call failed"),
            }
        }

        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> (Option<u16>, Result<T>) {
        let url = format!("{}{}", self.base_url, endpoint);
        let request_id = Uuid::new_v4().to_string();

        let mut request = self
            .http
            .request(options.method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.auth.snapshot().bearer_token() {
            request = request.bearer_auth(token);
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        if self.verbose {
            debug!(
                %url,
                method = %options.method,
                %request_id,
                body = ?options.body,
                "sending request"
            );
        }

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(err) => return (None, Err(err)),
        };

        let status = response.status();
        let code = status.as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return (Some(code), Err(InfraError::from(err).into())),
        };

        if self.verbose {
            debug!(
                %url,
                status = code,
                %request_id,
                body = %String::from_utf8_lossy(&body),
                "received response"
            );
        }

        if !status.is_success() {
            let message = envelope::error_message(&body).unwrap_or_default();
            return (Some(code), Err(StudyArcError::http(code, message)));
        }

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return (Some(code), envelope::decode_success(&[]));
        }

        (Some(code), envelope::decode_success(&body))
    }
}
