//! Inventory queries against the Docker daemon

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::network::{InspectNetworkOptions, ListNetworksOptions};
use bollard::node::ListNodesOptions;
use bollard::service::{InspectServiceOptions, ListServicesOptions};
use bollard::task::ListTasksOptions;
use bollard::Docker;
use serde::Serialize;
use serde_json::Value;
use tally_core::{Inventory, ResourceKind, Result, TallyError};

/// `Inventory` over a daemon connection
#[derive(Clone)]
pub struct DockerInventory {
    docker: Docker,
}

impl DockerInventory {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

/// IDs and names the daemon accepts; anything else never leaves the process
pub fn check_id(kind: ResourceKind, id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(TallyError::Inventory(format!("invalid {} id '{}'", kind, id)));
    }
    Ok(())
}

fn to_json<T: Serialize>(reply: std::result::Result<T, bollard::errors::Error>) -> std::result::Result<Value, String> {
    let reply = reply.map_err(|e| e.to_string())?;
    serde_json::to_value(reply).map_err(|e| e.to_string())
}

#[async_trait]
impl Inventory for DockerInventory {
    async fn list(&self, kind: ResourceKind) -> Result<Value> {
        let docker = &self.docker;
        let listed = match kind {
            ResourceKind::Container => to_json(docker.list_containers(None::<ListContainersOptions<String>>).await),
            ResourceKind::Service => to_json(docker.list_services(None::<ListServicesOptions<String>>).await),
            ResourceKind::Task => to_json(docker.list_tasks(None::<ListTasksOptions<String>>).await),
            ResourceKind::Node => to_json(docker.list_nodes(None::<ListNodesOptions<String>>).await),
            ResourceKind::Network => to_json(docker.list_networks(None::<ListNetworksOptions<String>>).await),
        };

        listed.map_err(|e| TallyError::Inventory(format!("listing {}s: {}", kind, e)))
    }

    async fn inspect(&self, kind: ResourceKind, id: &str) -> Result<Value> {
        check_id(kind, id)?;

        let docker = &self.docker;
        let inspected = match kind {
            ResourceKind::Container => to_json(docker.inspect_container(id, None::<InspectContainerOptions>).await),
            ResourceKind::Service => to_json(docker.inspect_service(id, None::<InspectServiceOptions>).await),
            ResourceKind::Task => to_json(docker.inspect_task(id).await),
            ResourceKind::Node => to_json(docker.inspect_node(id).await),
            ResourceKind::Network => {
                to_json(docker.inspect_network(id, None::<InspectNetworkOptions<String>>).await)
            }
        };

        inspected.map_err(|e| TallyError::Inventory(format!("inspecting {} {}: {}", kind, id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::API_DEFAULT_VERSION;

    fn unreachable() -> DockerInventory {
        DockerInventory::new(Docker::connect_with_http("tcp://127.0.0.1:1", 2, API_DEFAULT_VERSION).unwrap())
    }

    #[test]
    fn test_check_id_accepts_ids_and_names() {
        assert!(check_id(ResourceKind::Container, "3f4e9a").is_ok());
        assert!(check_id(ResourceKind::Node, "node-1.swarm_a").is_ok());
    }

    #[test]
    fn test_check_id_rejects_path_injection() {
        assert!(check_id(ResourceKind::Service, "../containers").is_err());
        assert!(check_id(ResourceKind::Service, "a?b=c").is_err());
        assert!(check_id(ResourceKind::Task, "").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_inventory_error() {
        let err = unreachable().list(ResourceKind::Container).await.unwrap_err();
        assert!(matches!(err, TallyError::Inventory(_)));
    }

    #[tokio::test]
    async fn test_invalid_id_rejected_before_request() {
        let err = unreachable().inspect(ResourceKind::Network, "../nodes").await.unwrap_err();
        match err {
            TallyError::Inventory(reason) => assert!(reason.contains("invalid network id")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
