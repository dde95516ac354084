//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Authentication
/// Credentials are valid for two hours
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 2 * 60 * 60;
/// Renew after three quarters of the lifetime
pub const DEFAULT_RENEWAL_FRACTION: f64 = 0.75;
/// Marker persisted when the real token lives in an HTTP-only cookie
pub const COOKIE_CREDENTIAL_MARKER: &str = "cookie-auth";

// HTTP client
/// Local development server
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
/// Per-request timeout
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
/// GET retries are off unless configured
pub const DEFAULT_MAX_GET_ATTEMPTS: usize = 1;
/// Correlation id sent with every call
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// Endpoints, relative to the configured base URL
/// Credential renewal
pub const ENDPOINT_AUTH_REFRESH: &str = "/auth/refresh";
/// Dashboard aggregate
pub const ENDPOINT_DASHBOARD_BATCH: &str = "/dashboard/batch";
/// Analytics aggregate
pub const ENDPOINT_ANALYTICS_BATCH: &str = "/analytics/batch";
/// Review screen aggregate
pub const ENDPOINT_REVIEW_BATCH: &str = "/reviews/batch";
/// Study history
pub const ENDPOINT_STUDY_LOGS: &str = "/study-logs";
/// Morning test results
pub const ENDPOINT_MORNING_TESTS: &str = "/morning-tests";
/// Score forecast, signed-in users only
pub const ENDPOINT_PREDICTIVE_ANALYSIS: &str = "/analytics/predictive";
/// Low-accuracy categories
pub const ENDPOINT_WEAK_AREAS: &str = "/analytics/weak-areas";
/// Review items due now
pub const ENDPOINT_REVIEWS_DUE: &str = "/reviews/due";
/// Overall totals
pub const ENDPOINT_STATISTICS: &str = "/statistics";
/// Subject catalogue
pub const ENDPOINT_CATEGORIES: &str = "/categories";
/// Quiz sessions; answers and completion are sub-paths
pub const ENDPOINT_QUIZ_SESSIONS: &str = "/quiz/sessions";

// Metrics
/// Latency samples kept for percentile queries
pub const CALL_SAMPLE_CAPACITY: usize = 1000;
