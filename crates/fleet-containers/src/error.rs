use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("container engine returned an empty container id for {container_name}")]
    EmptyId { container_name: String },

    #[error("container engine rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("no such container: {0}")]
    NotFound(String),
}
