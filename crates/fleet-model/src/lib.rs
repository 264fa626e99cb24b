//! Domain types shared by the master (`fleet-gateway`) and the agent
//! (`fleet-agent`): the closed enumerations, the node/task/container-spec
//! records, and the small helpers (`KeyValue`, `Flag`) used across them.
//!
//! Nothing here talks to the network or the filesystem — it is the
//! read-only vocabulary the rest of the workspace is built from.

mod error;
pub use error::ModelError;

mod kv;
pub use kv::KeyValue;

mod flag;
pub use flag::Flag;

mod task_type;
pub use task_type::TaskType;

mod device_type;
pub use device_type::DeviceType;

mod ids;
pub use ids::{NodeId, TaskId};

mod node;
pub use node::Node;

mod node_status;
pub use node_status::NodeStatus;

mod container_spec;
pub use container_spec::ContainerSpec;

mod profile;
pub use profile::{ExpectedOverhead, Profile};

mod schedule_strategy;
pub use schedule_strategy::ScheduleStrategy;

mod task;
pub use task::{ImageTask, TaskStatus};

mod client_request;
pub use client_request::ClientRequest;

mod service_slot;
pub use service_slot::{ServiceSlot, ServiceSlotState, SrvInfo};
