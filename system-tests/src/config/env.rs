// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed, as do empty values and a host
//! URL without the admin credentials needed to create test accounts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Study used when `BRIDGE_SYSTEM_TEST_STUDY` is unset.
pub const DEFAULT_STUDY: &str = "api";

/// Log level used when `BRIDGE_SYSTEM_TEST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted log level names.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional live service root; the in-process stub is used when unset.
    HostUrl,
    /// Optional study identifier override.
    Study,
    /// Admin account email (required with a host URL).
    AdminEmail,
    /// Admin account password (required with a host URL).
    AdminPassword,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional run root override for artifacts.
    RunRoot,
    /// Optional log level (`trace`, `debug`, `info`, `warn`, `error`).
    Log,
}

impl SystemTestEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 7] = [
        Self::HostUrl,
        Self::Study,
        Self::AdminEmail,
        Self::AdminPassword,
        Self::TimeoutSeconds,
        Self::RunRoot,
        Self::Log,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HostUrl => "BRIDGE_SYSTEM_TEST_HOST_URL",
            Self::Study => "BRIDGE_SYSTEM_TEST_STUDY",
            Self::AdminEmail => "BRIDGE_SYSTEM_TEST_ADMIN_EMAIL",
            Self::AdminPassword => "BRIDGE_SYSTEM_TEST_ADMIN_PASSWORD",
            Self::TimeoutSeconds => "BRIDGE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::RunRoot => "BRIDGE_SYSTEM_TEST_RUN_ROOT",
            Self::Log => "BRIDGE_SYSTEM_TEST_LOG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Live service root; `None` selects the in-process stub.
    pub host_url: Option<String>,
    /// Study the test accounts belong to.
    pub study: String,
    /// Admin account email.
    pub admin_email: Option<String>,
    /// Admin account password.
    pub admin_password: Option<String>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Lower-case log level name.
    pub log_level: String,
}

impl Default for SystemTestConfig {
    fn default() -> Self {
        Self {
            host_url: None,
            study: DEFAULT_STUDY.to_string(),
            admin_email: None,
            admin_password: None,
            timeout: None,
            run_root: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl fmt::Debug for SystemTestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemTestConfig")
            .field("host_url", &self.host_url)
            .field("study", &self.study)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("run_root", &self.run_root)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or log level, or a
    /// host URL without admin credentials).
    pub fn load() -> Result<Self, String> {
        let host_url = read_env_nonempty(SystemTestEnv::HostUrl.as_str())?
            .map(|value| value.trim().trim_end_matches('/').to_string());
        let study = read_env_nonempty(SystemTestEnv::Study.as_str())?
            .map_or_else(|| DEFAULT_STUDY.to_string(), |value| value.trim().to_string());
        let admin_email = read_env_nonempty(SystemTestEnv::AdminEmail.as_str())?
            .map(|value| value.trim().to_string());
        let admin_password = read_env_nonempty(SystemTestEnv::AdminPassword.as_str())?;
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let log_level = parse_log_level(
            SystemTestEnv::Log.as_str(),
            read_env_nonempty(SystemTestEnv::Log.as_str())?,
        )?;
        if host_url.is_some() && (admin_email.is_none() || admin_password.is_none()) {
            return Err(format!(
                "{} and {} are required when {} is set",
                SystemTestEnv::AdminEmail.as_str(),
                SystemTestEnv::AdminPassword.as_str(),
                SystemTestEnv::HostUrl.as_str(),
            ));
        }
        Ok(Self {
            host_url,
            study,
            admin_email,
            admin_password,
            timeout,
            run_root,
            log_level,
        })
    }

    /// Returns true when the suites run against the in-process stub.
    #[must_use]
    pub const fn is_hermetic(&self) -> bool {
        self.host_url.is_none()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Normalizes a log level name.
fn parse_log_level(name: &str, raw: Option<String>) -> Result<String, String> {
    let Some(value) = raw else {
        return Ok(DEFAULT_LOG_LEVEL.to_string());
    };
    let level = value.trim().to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(format!("{name} must be one of {}", LOG_LEVELS.join(", ")))
    }
}
