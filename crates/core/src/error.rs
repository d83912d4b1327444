//! Error types shared across the pipeline

use thiserror::Error;

/// Result type for tally operations
pub type Result<T> = std::result::Result<T, TallyError>;

/// Everything that can stop the regeneration pipeline
///
/// The pipeline treats every variant as fatal. `Inventory` is the one kind
/// that never reaches it: template helpers swallow it and substitute an
/// empty value.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load template {path}: {reason}")]
    Template { path: String, reason: String },

    #[error("render failed: {0}")]
    Render(String),

    #[error("failed to write output to {dest}: {source}")]
    Sink {
        dest: String,
        #[source]
        source: std::io::Error,
    },

    #[error("event subscription failed: {0}")]
    Source(String),

    #[error("event stream terminated: {0}")]
    SourceTerminated(String),

    #[error("inventory query failed: {0}")]
    Inventory(String),

    #[error("pipeline task aborted: {0}")]
    Task(String),
}

impl TallyError {
    /// Wrap an I/O failure on the output destination
    pub fn sink(dest: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            dest: dest.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_message_names_destination() {
        let err = TallyError::sink(
            "/etc/haproxy/haproxy.cfg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/etc/haproxy/haproxy.cfg"));
        assert!(msg.contains("denied"));
    }
}
