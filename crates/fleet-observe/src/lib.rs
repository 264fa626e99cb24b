//! Structured logging for the master and the agent.
//!
//! Three output shapes, selected by `LoggerFormat`: human-readable text
//! (local dev), JSON (ingested by a log pipeline), and journald (native
//! systemd units). Call `logger_init` once at process startup.

mod config;
mod error;
mod format;
mod log;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::Logger::text(cfg),
        LoggerFormat::Json => log::Logger::json(cfg),
        LoggerFormat::Journald => log::Logger::journald(cfg),
    }
}
