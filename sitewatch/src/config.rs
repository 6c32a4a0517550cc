//! Configuration loading
//!
//! Reads the endpoint list and the secrets file once at startup and turns them
//! into an explicit [`Settings`] value. Nothing below the orchestrator looks up
//! environment variables on its own.
//!
//! Lookup precedence for every key: process environment > secrets file > default.
//! Deprecated key names are still accepted and produce a warning log.

use sitewatch_common::config::{NotifyTransport, Settings};
use sitewatch_common::types::Endpoint;
use sitewatch_common::CommonError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default endpoint list path
pub const DEFAULT_ENDPOINTS_PATH: &str = "endpoints.txt";

/// Default secrets file path
pub const DEFAULT_SECRETS_PATH: &str = "secrets.env";

/// Fatal configuration error. The run aborts before any probing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint list file does not exist
    #[error("endpoint list not found: {0}")]
    EndpointsMissing(PathBuf),

    /// Secrets file does not exist
    #[error("secrets file not found: {0}")]
    SecretsMissing(PathBuf),

    /// File exists but could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Secrets file has a malformed line
    #[error("failed to parse secrets file {path}: {message}")]
    SecretsParse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A key has a value that cannot be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Key name
        key: String,
        /// Raw value
        value: String,
    },

    /// Validation error from the common layer
    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use sitewatch::config::get_env_with_fallback;
///
/// let level = get_env_with_fallback("SITEWATCH_LOG_LEVEL", "RUST_LOG");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Interpret `true/1/yes/on` (case-insensitive) as true
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse an endpoint list: one URL per line, `#` comments and blank lines ignored
///
/// A URL listed more than once is kept only at its first position, so a run
/// never alerts twice for the same endpoint.
pub fn parse_endpoints(text: &str) -> Result<Vec<Endpoint>, ConfigError> {
    let mut seen = HashSet::new();
    let mut endpoints = Vec::new();
    for line in text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        if !seen.insert(line) {
            tracing::warn!(endpoint = line, "Duplicate endpoint ignored");
            continue;
        }
        endpoints.push(Endpoint::new(line)?);
    }
    Ok(endpoints)
}

/// Read the endpoint list file. A missing file is fatal.
pub fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::EndpointsMissing(path.to_path_buf())
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let endpoints = parse_endpoints(&text)?;
    if endpoints.is_empty() {
        tracing::warn!(path = %path.display(), "Endpoint list is empty");
    }
    Ok(endpoints)
}

/// Key/value source for secrets and tunables
///
/// Holds the pairs parsed from the secrets file and, optionally, consults the
/// process environment first.
#[derive(Debug, Clone, Default)]
pub struct SecretSource {
    values: HashMap<String, String>,
    use_process_env: bool,
}

impl SecretSource {
    /// Source with no values
    pub fn empty() -> Self {
        Self::default()
    }

    /// Source built from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            use_process_env: false,
        }
    }

    /// Parse a dotenv-style `KEY=VALUE` file without exporting it to the process environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let iter = dotenv::from_path_iter(path).map_err(|e| match e {
            dotenv::Error::Io(source) if source.kind() == std::io::ErrorKind::NotFound => {
                ConfigError::SecretsMissing(path.to_path_buf())
            }
            dotenv::Error::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            other => ConfigError::SecretsParse {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

        let mut values = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::SecretsParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            values.insert(key, value);
        }

        Ok(Self {
            values,
            use_process_env: false,
        })
    }

    /// Let process environment variables override file values
    pub fn with_process_env(mut self) -> Self {
        self.use_process_env = true;
        self
    }

    /// Look up a key (empty values count as unset)
    pub fn get(&self, key: &str) -> Option<String> {
        let from_env = if self.use_process_env {
            std::env::var(key).ok()
        } else {
            None
        };
        from_env
            .or_else(|| self.values.get(key).cloned())
            .filter(|v| !v.trim().is_empty())
    }

    /// Look up a key, falling back to a deprecated name with a warning
    pub fn get_with_fallback(&self, new_name: &str, old_name: &str) -> Option<String> {
        if let Some(val) = self.get(new_name) {
            return Some(val);
        }
        if let Some(val) = self.get(old_name) {
            tracing::warn!(
                "Setting '{}' is deprecated, use '{}' instead",
                old_name,
                new_name
            );
            return Some(val);
        }
        None
    }

    /// Parse a key's value, returning `default` when unset
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw,
                }),
            None => Ok(default),
        }
    }
}

/// Load secrets. An explicitly given path must exist; the default path may be absent.
pub fn load_secrets(explicit: Option<&Path>) -> Result<SecretSource, ConfigError> {
    let source = match explicit {
        Some(path) => SecretSource::from_file(path)?,
        None => match SecretSource::from_file(Path::new(DEFAULT_SECRETS_PATH)) {
            Ok(source) => source,
            Err(ConfigError::SecretsMissing(path)) => {
                tracing::debug!(path = %path.display(), "No secrets file, using defaults");
                SecretSource::empty()
            }
            Err(e) => return Err(e),
        },
    };
    Ok(source.with_process_env())
}

/// Build the run settings from a secret source
pub fn settings_from_source(source: &SecretSource) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let probe = &mut settings.probe;
    probe.connect_timeout_secs =
        source.parse_or("SITEWATCH_CONNECT_TIMEOUT_SECS", probe.connect_timeout_secs)?;
    probe.timeout_secs = source.parse_or("SITEWATCH_TIMEOUT_SECS", probe.timeout_secs)?;
    probe.concurrency = source.parse_or("SITEWATCH_CONCURRENCY", probe.concurrency)?;

    let advisory = &mut settings.advisory;
    advisory.enabled = source
        .get_with_fallback("SITEWATCH_ADVISORY_ENABLED", "ENABLE_AI")
        .map(|v| parse_bool(&v))
        .unwrap_or(advisory.enabled);
    advisory.api_key = source
        .get("SITEWATCH_ADVISORY_API_KEY")
        .or_else(|| source.get("OPENAI_API_KEY"));
    if let Some(url) = source.get("SITEWATCH_ADVISORY_URL") {
        advisory.api_url = url;
    }
    if let Some(model) = source.get("SITEWATCH_ADVISORY_MODEL") {
        advisory.model = model;
    }
    advisory.max_tokens = source.parse_or("SITEWATCH_ADVISORY_MAX_TOKENS", advisory.max_tokens)?;
    advisory.temperature =
        source.parse_or("SITEWATCH_ADVISORY_TEMPERATURE", advisory.temperature)?;
    advisory.timeout_secs =
        source.parse_or("SITEWATCH_ADVISORY_TIMEOUT_SECS", advisory.timeout_secs)?;

    let notify = &mut settings.notify;
    notify.transport = match source.get("SITEWATCH_NOTIFY_TRANSPORT") {
        Some(raw) => raw
            .parse::<NotifyTransport>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "SITEWATCH_NOTIFY_TRANSPORT".to_string(),
                value: raw,
            })?,
        None => notify.transport,
    };
    if let Some(from) = source.get_with_fallback("SITEWATCH_ALERT_FROM", "EMAIL_FROM") {
        notify.from = from;
    }
    notify.to = source.get_with_fallback("SITEWATCH_ALERT_TO", "EMAIL_TO");
    if let Some(path) = source.get("SITEWATCH_SENDMAIL_PATH") {
        notify.sendmail_path = path;
    }
    notify.webhook_url = source.get("SITEWATCH_WEBHOOK_URL");
    notify.timeout_secs = source.parse_or("SITEWATCH_NOTIFY_TIMEOUT_SECS", notify.timeout_secs)?;

    settings.validate()?;
    Ok(settings)
}
