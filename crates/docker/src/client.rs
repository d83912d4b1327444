//! Docker daemon connection
//!
//! Follows the Docker CLI environment: `DOCKER_HOST` picks the transport,
//! `DOCKER_TLS_VERIFY` / `DOCKER_CERT_PATH` switch TCP to TLS, and
//! `DOCKER_API_VERSION` pins the API version instead of negotiating it.

use anyhow::{anyhow, bail, Context, Result};
use bollard::{ClientVersion, Docker, API_DEFAULT_VERSION};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Docker daemon address used when `DOCKER_HOST` is unset
#[cfg(not(windows))]
pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

/// Docker daemon address used when `DOCKER_HOST` is unset
#[cfg(windows)]
pub const DEFAULT_HOST: &str = "npipe:////./pipe/docker_engine";

/// Seconds before a request to the daemon is abandoned
const TIMEOUT_SECS: u64 = 120;

/// How a daemon address is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Unix,
    NamedPipe,
    Tcp,
}

impl Transport {
    /// Classify a `DOCKER_HOST` style address by its scheme
    pub fn of(host: &str) -> Result<Self> {
        if host.starts_with("unix://") {
            Ok(Transport::Unix)
        } else if host.starts_with("npipe://") {
            Ok(Transport::NamedPipe)
        } else if host.starts_with("tcp://") || host.starts_with("http://") {
            Ok(Transport::Tcp)
        } else {
            bail!(
                "Unsupported docker host '{}' (expected unix://, npipe:// or tcp://)",
                host
            )
        }
    }
}

/// Parse a `DOCKER_API_VERSION` value such as "1.43"
pub fn parse_api_version(version: &str) -> Option<ClientVersion> {
    let (major, minor) = version.trim().trim_start_matches('v').split_once('.')?;
    Some(ClientVersion {
        major_version: major.parse().ok()?,
        minor_version: minor.parse().ok()?,
    })
}

/// Connect to the daemon at `host`, or wherever the environment points
///
/// Negotiation failure is not fatal: the client then keeps the library's
/// default API version.
pub async fn connect(host: Option<&str>) -> Result<Docker> {
    let host = match host {
        Some(host) => host.to_string(),
        None => env::var("DOCKER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
    };

    let pinned = match env::var("DOCKER_API_VERSION") {
        Ok(raw) if !raw.is_empty() => Some(
            parse_api_version(&raw).ok_or_else(|| anyhow!("Invalid DOCKER_API_VERSION '{}'", raw))?,
        ),
        _ => None,
    };

    let is_pinned = pinned.is_some();
    let version = pinned.unwrap_or(ClientVersion {
        major_version: API_DEFAULT_VERSION.major_version,
        minor_version: API_DEFAULT_VERSION.minor_version,
    });

    let docker = open(&host, &version).with_context(|| format!("Failed to set up Docker client for {}", host))?;

    if is_pinned {
        debug!("Using pinned Docker API version {}.{}", version.major_version, version.minor_version);
        return Ok(docker);
    }

    match docker.clone().negotiate_version().await {
        Ok(negotiated) => {
            debug!("Negotiated Docker API version with {}", host);
            Ok(negotiated)
        }
        Err(e) => {
            warn!("Docker API version negotiation failed, keeping the default: {}", e);
            Ok(docker)
        }
    }
}

fn open(host: &str, version: &ClientVersion) -> Result<Docker> {
    match Transport::of(host)? {
        #[cfg(unix)]
        Transport::Unix => Ok(Docker::connect_with_unix(host, TIMEOUT_SECS, version)?),
        #[cfg(not(unix))]
        Transport::Unix => bail!("Unix sockets are not supported on this platform"),

        #[cfg(windows)]
        Transport::NamedPipe => Ok(Docker::connect_with_named_pipe(host, TIMEOUT_SECS, version)?),
        #[cfg(not(windows))]
        Transport::NamedPipe => bail!("Named pipes are only supported on Windows"),

        Transport::Tcp if tls_verify() => {
            let certs = cert_dir()?;
            Ok(Docker::connect_with_ssl(
                host,
                &certs.join("key.pem"),
                &certs.join("cert.pem"),
                &certs.join("ca.pem"),
                TIMEOUT_SECS,
                version,
            )?)
        }
        Transport::Tcp => Ok(Docker::connect_with_http(host, TIMEOUT_SECS, version)?),
    }
}

fn tls_verify() -> bool {
    env::var("DOCKER_TLS_VERIFY").map(|v| !v.is_empty()).unwrap_or(false)
}

/// `DOCKER_CERT_PATH`, or `~/.docker` like the Docker CLI
fn cert_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("DOCKER_CERT_PATH") {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("DOCKER_TLS_VERIFY is set but neither DOCKER_CERT_PATH nor HOME is")?;
    Ok(PathBuf::from(home).join(".docker"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_by_scheme() {
        assert_eq!(Transport::of("unix:///var/run/docker.sock").unwrap(), Transport::Unix);
        assert_eq!(Transport::of("npipe:////./pipe/docker_engine").unwrap(), Transport::NamedPipe);
        assert_eq!(Transport::of("tcp://10.0.0.5:2376").unwrap(), Transport::Tcp);
        assert_eq!(Transport::of("http://docker:2375").unwrap(), Transport::Tcp);
    }

    #[test]
    fn test_transport_rejects_unknown_scheme() {
        assert!(Transport::of("ssh://me@host").is_err());
        assert!(Transport::of("/var/run/docker.sock").is_err());
    }

    #[test]
    fn test_default_host_is_supported() {
        assert!(Transport::of(DEFAULT_HOST).is_ok());
    }

    #[test]
    fn test_parse_api_version() {
        let version = parse_api_version("1.43").unwrap();
        assert_eq!((version.major_version, version.minor_version), (1, 43));

        let version = parse_api_version("v1.41").unwrap();
        assert_eq!((version.major_version, version.minor_version), (1, 41));

        assert!(parse_api_version("latest").is_none());
        assert!(parse_api_version("1").is_none());
    }

    #[tokio::test]
    async fn test_tcp_host_builds_client_without_daemon() {
        // Plain TCP connects lazily, so no daemon is needed to build it
        let version = parse_api_version("1.41").unwrap();
        assert!(open("tcp://127.0.0.1:1", &version).is_ok());
    }
}
