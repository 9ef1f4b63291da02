//! Shared HTTP plumbing for the API clients

use std::io;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::VendorError;

/// Configuration for the HTTP client of one API.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout, including reading the body
    pub request_timeout: Duration,

    /// Idle connection timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 64,
            user_agent: "GraphQL-vs-REST-Experiment".to_string(),
        }
    }
}

impl HttpConfig {
    /// Create config with custom request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create config with custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build a pooled client sending `headers` on every request.
pub(crate) fn build_client(
    config: &HttpConfig,
    headers: &[(HeaderName, String)],
) -> Result<Client, VendorError> {
    let mut default_headers = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let value = HeaderValue::from_str(value)
            .map_err(|_| VendorError::InvalidHeader(name.to_string()))?;
        default_headers.insert(name.clone(), value);
    }

    let client = Client::builder()
        .timeout(config.request_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .default_headers(default_headers)
        .build()?;

    Ok(client)
}

/// Byte length of `value` in the reference serialization.
///
/// The reference form separates items with `", "` and keys with `": "`, and
/// escapes every character outside printable ASCII as `\uXXXX` (UTF-16 code
/// units).
pub fn payload_size(value: &serde_json::Value) -> u64 {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, ReferenceFormatter);
    // Serializing a Value cannot fail; fall back to 0 rather than panic
    match value.serialize(&mut ser) {
        Ok(()) => buf.len() as u64,
        Err(_) => 0,
    }
}

/// Spaced separators and ASCII-only strings
struct ReferenceFormatter;

impl Formatter for ReferenceFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units).iter() {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Why a request failed, and the status to record for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub status: Option<u16>,
    pub message: String,
}

impl Failure {
    pub(crate) fn http(status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}"),
        }
    }

    pub(crate) fn body(status: reqwest::StatusCode, err: impl std::fmt::Display) -> Self {
        Self {
            status: Some(status.as_u16()),
            message: format!("invalid response body: {err}"),
        }
    }

    /// Failure with no HTTP status to report
    pub(crate) fn without_status(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: describe_error(&err),
        }
    }
}

/// Human-readable transport error, classifying timeouts and refused connections.
fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
