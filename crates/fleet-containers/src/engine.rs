use async_trait::async_trait;
use fleet_model::ContainerSpec;

use crate::error::ContainerError;

/// Docker's container lifecycle state, as reported by `GET
/// /containers/{id}/json`'s `State.Status` field. Only the states C8's
/// `Creating` poll loop (§4.8) cares about are named; anything else maps
/// to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    Other,
}

/// The narrow container-engine surface the lifecycle controller (C8)
/// needs: create, start, remove, and poll state. Modeled on the Docker
/// Engine REST API but deliberately not Docker-specific in its shape, so
/// a test double can implement it without a daemon.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn create(&self, spec: &ContainerSpec) -> Result<String, ContainerError>;

    async fn start(&self, container_id: &str) -> Result<(), ContainerError>;

    /// Remove with `v=false, force=true, link=false`, matching the
    /// parameters C8's idle-reap path always uses (§4.8).
    async fn remove(&self, container_id: &str) -> Result<(), ContainerError>;

    async fn inspect_state(&self, container_id: &str) -> Result<ContainerState, ContainerError>;
}
