use thiserror::Error;

/// Errors raised while interpreting domain values (not I/O, not scheduling).
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("unknown schedule strategy: {0}")]
    UnknownScheduleStrategy(String),
}
