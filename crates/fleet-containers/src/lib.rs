//! The container-engine REST client (§4.13): the narrow `ContainerEngine`
//! trait C8 drives, and a `reqwest`-backed implementation talking to a
//! Docker-Engine-compatible API over TCP.

mod client;
mod engine;
mod error;

pub use client::DockerEngineClient;
pub use engine::{ContainerEngine, ContainerState};
pub use error::ContainerError;
