use thiserror::Error;

/// Errors raised by the agent's collector, registration, and supervisor
/// machinery.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {file}: {reason}")]
    MalformedConfig { file: String, reason: String },

    #[error("request to master failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("initial registration with master failed")]
    RegistrationFailed,

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("service {0} has no start_cmd configured")]
    MissingStartCmd(String),
}
