//! Runtime configuration
//!
//! Values come from (lowest to highest precedence): built-in defaults, an
//! optional TOML file, then environment/command-line overrides applied by
//! the CLI.

use crate::error::{Result, TallyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default quiet period before a batch is rendered
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 1_000;

/// Default ceiling on how long a batch may stay open
pub const DEFAULT_MAX_WAIT_MS: u64 = 10_000;

/// Timing rules for coalescing notifications into render requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncePolicy {
    /// Reset on every notification; firing emits the latest one
    pub quiet_period: Duration,
    /// Started by the first notification of a batch and never reset
    pub max_wait: Duration,
}

impl DebouncePolicy {
    pub fn new(quiet_period: Duration, max_wait: Duration) -> Self {
        Self {
            quiet_period,
            max_wait,
        }
    }

    /// Quiet period longer than max-wait: every batch fires on max-wait
    pub fn is_degenerate(&self) -> bool {
        self.quiet_period > self.max_wait
    }
}

impl Default for DebouncePolicy {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_QUIET_PERIOD_MS),
            Duration::from_millis(DEFAULT_MAX_WAIT_MS),
        )
    }
}

/// `[debounce]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds (default: 1000)
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Max wait in milliseconds (default: 10000)
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            max_wait_ms: DEFAULT_MAX_WAIT_MS,
        }
    }
}

impl DebounceConfig {
    pub fn policy(&self) -> DebouncePolicy {
        DebouncePolicy::new(
            Duration::from_millis(self.quiet_period_ms),
            Duration::from_millis(self.max_wait_ms),
        )
    }
}

fn default_quiet_period_ms() -> u64 {
    DEFAULT_QUIET_PERIOD_MS
}

fn default_max_wait_ms() -> u64 {
    DEFAULT_MAX_WAIT_MS
}

/// Complete tally configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Template file to render
    #[serde(default)]
    pub template: PathBuf,

    /// Output file; unset or "-" writes to stdout
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Docker daemon address (unix:// or tcp://)
    #[serde(default)]
    pub docker_host: Option<String>,

    /// Coalescing timings
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// Event subscription filters, e.g. `type = ["container", "service"]`
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| TallyError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TallyError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load from `path` if given, otherwise start from defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Output file path, or `None` for stdout
    pub fn output_path(&self) -> Option<&Path> {
        match &self.output {
            Some(path) if path.as_os_str() != "-" => Some(path.as_path()),
            _ => None,
        }
    }

    /// Resolved debounce policy
    pub fn policy(&self) -> DebouncePolicy {
        self.debounce.policy()
    }

    /// Check the configuration is usable
    ///
    /// A quiet period longer than max-wait is allowed; it only degrades
    /// coalescing to one render per max-wait.
    pub fn validate(&self) -> Result<()> {
        if self.template.as_os_str().is_empty() {
            return Err(TallyError::Config(
                "no template configured (set TALLY_TEMPLATE or --template)".to_string(),
            ));
        }

        if self.debounce.max_wait_ms == 0 {
            return Err(TallyError::Config(
                "debounce.max_wait_ms must be greater than 0".to_string(),
            ));
        }

        if self.policy().is_degenerate() {
            tracing::warn!(
                quiet_period_ms = self.debounce.quiet_period_ms,
                max_wait_ms = self.debounce.max_wait_ms,
                "quiet period exceeds max wait; renders will happen once per max wait"
            );
        }

        Ok(())
    }
}

/// Commented example configuration file
pub fn example_config() -> &'static str {
    r#"# tally configuration

# Template to render (also: TALLY_TEMPLATE, --template)
template = "/etc/tally/haproxy.cfg.tmpl"

# Destination file; "-" or unset writes to stdout (also: TALLY_OUTPUT, --output)
output = "/etc/haproxy/haproxy.cfg"

# Docker daemon (also: DOCKER_HOST, --docker-host)
# docker_host = "unix:///var/run/docker.sock"

[debounce]
# Render once events have been quiet this long
quiet_period_ms = 1000
# Never let a burst delay a render longer than this
max_wait_ms = 10000

# Only subscribe to these events (Docker events API filters)
[filters]
type = ["container", "service", "network"]
event = ["create", "destroy", "remove", "update"]
"#
}
