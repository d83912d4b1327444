//! Live resource inventory used by templates

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Kinds of orchestration resources a template can enumerate or inspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Container,
    Service,
    Task,
    Node,
    Network,
}

impl ResourceKind {
    /// All kinds, in the order templates usually list them
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Container,
        ResourceKind::Service,
        ResourceKind::Task,
        ResourceKind::Node,
        ResourceKind::Network,
    ];

    /// Lowercase singular name
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Service => "service",
            ResourceKind::Task => "task",
            ResourceKind::Node => "node",
            ResourceKind::Network => "network",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the resources currently known to the platform
///
/// Results are raw JSON documents so templates see exactly what the
/// platform reports.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// List every resource of the given kind (a JSON array)
    async fn list(&self, kind: ResourceKind) -> Result<Value>;

    /// Inspect one resource by ID (a JSON object)
    async fn inspect(&self, kind: ResourceKind, id: &str) -> Result<Value>;
}
