//! Inspector Configuration
//!
//! Bind address, route paths and the default scan prefix. Every field has a
//! default, so an empty JSON object is a valid config file.

use std::fs;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use super::errors::{InspectError, InspectResult};
use crate::observability::Severity;

/// Bytes escaped in the `prefix` query value. `:` and `/` stay readable.
const PREFIX_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Inspector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 9999, 0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the inspection page (default: "/inspect")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Path that resumes a paused workload (default: "/resume")
    #[serde(default = "default_resume_path")]
    pub resume_path: String,

    /// Prefix scanned when a request carries none (default: "analysis:")
    #[serde(default = "default_prefix")]
    pub default_prefix: String,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    // Unauthenticated; keep it off the network unless asked.
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_endpoint() -> String {
    "/inspect".to_string()
}

fn default_resume_path() -> String {
    "/resume".to_string()
}

fn default_prefix() -> String {
    "analysis:".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
            resume_path: default_resume_path(),
            default_prefix: default_prefix(),
            log_level: default_log_level(),
        }
    }
}

impl InspectorConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load a JSON config file and validate it.
    pub fn load(path: &Path) -> InspectResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            InspectError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            InspectError::Config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the router cannot serve.
    pub fn validate(&self) -> InspectResult<()> {
        for (name, path) in [("endpoint", &self.endpoint), ("resume_path", &self.resume_path)] {
            if !path.starts_with('/') {
                return Err(InspectError::Config(format!(
                    "{} must start with '/': {:?}",
                    name, path
                )));
            }
        }
        if self.endpoint == self.resume_path {
            return Err(InspectError::Config(format!(
                "endpoint and resume_path are both {:?}",
                self.endpoint
            )));
        }
        if Severity::parse(&self.log_level).is_none() {
            return Err(InspectError::Config(format!(
                "unknown log_level {:?}",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Minimum severity named by `log_level`.
    pub fn severity(&self) -> Severity {
        Severity::parse_or_info(&self.log_level)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Operator-facing URL of the inspection page.
    ///
    /// `port` is the bound port, which differs from `self.port` when that is 0.
    /// The prefix is percent-encoded for the query string.
    pub fn inspect_url(&self, port: u16, prefix: &str) -> String {
        format!(
            "http://localhost:{}{}?prefix={}",
            port,
            self.endpoint,
            utf8_percent_encode(prefix, PREFIX_ENCODE)
        )
    }
}
