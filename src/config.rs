use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SqlSessionError;
use crate::session::Session;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Options for opening a [`Session`].
///
/// Deserializable, so a session can be described in a config file:
/// ```rust
/// use sql_session::prelude::*;
///
/// let opts: SessionOptions =
///     serde_json::from_str(r#"{ "url": "sqlite::memory:", "read_only": false }"#).unwrap();
/// assert_eq!(opts.busy_timeout_ms, 5_000);
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SessionOptions {
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub read_only: bool,
}

impl SessionOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: None,
            password: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            read_only: false,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// Fluent builder for session options.
#[derive(Debug, Clone)]
pub struct SessionOptionsBuilder {
    opts: SessionOptions,
}

impl SessionOptionsBuilder {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            opts: SessionOptions::new(url),
        }
    }

    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.opts = self.opts.with_credentials(user, password);
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.opts.read_only = read_only;
        self
    }

    #[must_use]
    pub fn finish(self) -> SessionOptions {
        self.opts
    }

    /// Open a session with these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlSessionError` if the URL is unsupported or the database cannot be opened.
    pub fn build(self) -> Result<Session, SqlSessionError> {
        Session::open_with(self.finish())
    }
}

/// Where a connection URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Memory,
    Path(PathBuf),
    /// `SQLite` `file:` URI, handed to the driver untouched.
    Uri(String),
}

/// Resolve a connection URL.
///
/// Accepted: `sqlite::memory:`, `:memory:`, `sqlite://<path>`, `sqlite:<path>`,
/// `file:<uri>`, or a bare path.
pub(crate) fn parse_url(url: &str) -> Result<Target, SqlSessionError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(SqlSessionError::ConfigError("connection URL is empty".into()));
    }
    if matches!(url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
        return Ok(Target::Memory);
    }
    if url.starts_with("file:") {
        return Ok(Target::Uri(url.to_string()));
    }
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if path.contains("://") {
        return Err(SqlSessionError::ConfigError(format!(
            "unsupported connection URL scheme: {url}"
        )));
    }
    if path.is_empty() {
        return Err(SqlSessionError::ConfigError(format!(
            "connection URL has no database path: {url}"
        )));
    }
    Ok(Target::Path(PathBuf::from(path)))
}
