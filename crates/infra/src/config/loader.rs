//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `STUDYARC_API_BASE_URL` is not set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Uses built-in defaults when no file exists either
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `STUDYARC_API_BASE_URL`: Base URL of the study service (required)
//! - `STUDYARC_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `STUDYARC_API_VERBOSE`: Log requests and responses (true/false)
//! - `STUDYARC_API_MAX_GET_ATTEMPTS`: Total attempts for GET calls
//! - `STUDYARC_TOKEN_LIFETIME_SECS`: Credential lifetime in seconds
//! - `STUDYARC_RENEWAL_FRACTION`: Fraction of the lifetime before renewal
//! - `STUDYARC_CREDENTIAL_PATH`: File backing the persisted credential
//! - `STUDYARC_LOG_FILTER`: `EnvFilter` directive
//! - `STUDYARC_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./studyarc.json` or `./studyarc.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use studyarc_domain::{Config, Result, StudyArcError};

/// Load configuration with automatic fallback strategy
///
/// Environment first, then the first config file found, then defaults.
///
/// # Errors
/// Returns `StudyArcError::Config` if:
/// - An environment variable has an invalid value
/// - A config file exists but cannot be read or parsed
/// - The resulting configuration fails validation
pub fn load() -> Result<Config> {
    let config = if std::env::var_os(ENV_API_BASE_URL).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration found, using defaults");
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

const ENV_API_BASE_URL: &str = "STUDYARC_API_BASE_URL";

/// Load configuration from environment variables
///
/// `STUDYARC_API_BASE_URL` is required; every other variable falls back to
/// its default when unset.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `StudyArcError::Config` if the base URL is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var(ENV_API_BASE_URL)?;
    if let Some(timeout) = env_parse::<u64>("STUDYARC_API_TIMEOUT_SECS", "timeout")? {
        config.api.timeout_seconds = timeout;
    }
    config.api.verbose = env_bool("STUDYARC_API_VERBOSE", config.api.verbose);
    if let Some(attempts) = env_parse::<usize>("STUDYARC_API_MAX_GET_ATTEMPTS", "attempt count")? {
        config.api.max_get_attempts = attempts;
    }

    if let Some(lifetime) = env_parse::<u64>("STUDYARC_TOKEN_LIFETIME_SECS", "token lifetime")? {
        config.auth.token_lifetime_seconds = lifetime;
    }
    if let Some(fraction) = env_parse::<f64>("STUDYARC_RENEWAL_FRACTION", "renewal fraction")? {
        config.auth.renewal_fraction = fraction;
    }
    if let Ok(path) = std::env::var("STUDYARC_CREDENTIAL_PATH") {
        config.auth.credential_path = Some(path);
    }

    if let Ok(filter) = std::env::var("STUDYARC_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("STUDYARC_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields left out of the file keep their defaults.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `StudyArcError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StudyArcError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StudyArcError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StudyArcError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `StudyArcError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StudyArcError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StudyArcError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(StudyArcError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Range checks plus a full parse of the base URL
///
/// # Errors
/// Returns `StudyArcError::Config` describing the first invalid field.
pub fn validate(config: &Config) -> Result<()> {
    config.validate()?;
    url::Url::parse(&config.api.base_url).map_err(|e| {
        StudyArcError::Config(format!("Invalid api.base_url '{}': {}", config.api.base_url, e))
    })?;
    Ok(())
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./studyarc.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("studyarc.json"),
        dir.join("studyarc.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `StudyArcError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        StudyArcError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `StudyArcError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| StudyArcError::Config(format!("Invalid {} in {}: {}", what, key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 9] = [
        "STUDYARC_API_BASE_URL",
        "STUDYARC_API_TIMEOUT_SECS",
        "STUDYARC_API_VERBOSE",
        "STUDYARC_API_MAX_GET_ATTEMPTS",
        "STUDYARC_TOKEN_LIFETIME_SECS",
        "STUDYARC_RENEWAL_FRACTION",
        "STUDYARC_CREDENTIAL_PATH",
        "STUDYARC_LOG_FILTER",
        "STUDYARC_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        for (key, value) in [
            ("TEST_BOOL_TRUE_1", "1"),
            ("TEST_BOOL_TRUE_TRUE", "true"),
            ("TEST_BOOL_TRUE_YES", "yes"),
            ("TEST_BOOL_TRUE_ON", "on"),
            ("TEST_BOOL_TRUE_UPPER", "TRUE"),
        ] {
            std::env::set_var(key, value);
            assert!(env_bool(key, false), "{value} should parse as true");
            std::env::remove_var(key);
        }

        for (key, value) in [
            ("TEST_BOOL_FALSE_0", "0"),
            ("TEST_BOOL_FALSE_FALSE", "false"),
            ("TEST_BOOL_FALSE_NO", "no"),
            ("TEST_BOOL_FALSE_OFF", "off"),
        ] {
            std::env::set_var(key, value);
            assert!(!env_bool(key, true), "{value} should parse as false");
            std::env::remove_var(key);
        }

        // Test default when not set
        std::env::remove_var("TEST_BOOL_MISSING");
        assert!(env_bool("TEST_BOOL_MISSING", true));
        assert!(!env_bool("TEST_BOOL_MISSING", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("STUDYARC_API_BASE_URL", "https://study.example.com/api");
        std::env::set_var("STUDYARC_API_TIMEOUT_SECS", "10");
        std::env::set_var("STUDYARC_API_VERBOSE", "yes");
        std::env::set_var("STUDYARC_API_MAX_GET_ATTEMPTS", "3");
        std::env::set_var("STUDYARC_TOKEN_LIFETIME_SECS", "3600");
        std::env::set_var("STUDYARC_RENEWAL_FRACTION", "0.5");
        std::env::set_var("STUDYARC_CREDENTIAL_PATH", "/tmp/studyarc/credential.json");
        std::env::set_var("STUDYARC_LOG_FILTER", "debug");
        std::env::set_var("STUDYARC_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.base_url, "https://study.example.com/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert!(config.api.verbose);
        assert_eq!(config.api.max_get_attempts, 3);
        assert_eq!(config.auth.token_lifetime_seconds, 3600);
        assert_eq!(config.auth.renewal_delay(), Duration::from_secs(1800));
        assert_eq!(config.auth.credential_path.as_deref(), Some("/tmp/studyarc/credential.json"));
        assert_eq!(config.logging.filter, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_only_base_url_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("STUDYARC_API_BASE_URL", "http://localhost:4000/api");
        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        let defaults = Config::default();
        assert_eq!(config.api.timeout_seconds, defaults.api.timeout_seconds);
        assert_eq!(config.auth, defaults.auth);
        assert_eq!(config.logging, defaults.logging);
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(StudyArcError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("STUDYARC_API_BASE_URL", "http://localhost:4000/api");
        std::env::set_var("STUDYARC_API_TIMEOUT_SECS", "not-a-number");
        let result = load_from_env();
        clear_env();

        match result {
            Err(StudyArcError::Config(message)) => {
                assert!(message.contains("STUDYARC_API_TIMEOUT_SECS"));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_invalid_env_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("STUDYARC_API_BASE_URL", "http://localhost:4000/api");
        std::env::set_var("STUDYARC_RENEWAL_FRACTION", "1.5");
        let result = load();
        clear_env();

        assert!(matches!(result, Err(StudyArcError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "api": { "base_url": "https://study.example.com/api", "verbose": true },
                "auth": { "renewal_fraction": 0.5 }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON file");
        assert_eq!(config.api.base_url, "https://study.example.com/api");
        assert!(config.api.verbose);
        assert_eq!(config.auth.renewal_fraction, 0.5);
        assert_eq!(config.logging, Default::default());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[api]
base_url = "https://study.example.com/api"
max_get_attempts = 2

[logging]
filter = "studyarc_infra=debug"
json = true
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML file");
        assert_eq!(config.api.max_get_attempts, 2);
        assert_eq!(config.logging.filter, "studyarc_infra=debug");
        assert!(config.logging.json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(StudyArcError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(result.is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let mut config = Config::default();
        config.api.base_url = "http://".to_string();
        assert!(matches!(validate(&config), Err(StudyArcError::Config(_))));

        assert!(validate(&Config::default()).is_ok());
    }
}
