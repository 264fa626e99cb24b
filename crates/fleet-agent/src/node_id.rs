//! Persistence for the agent's stable `NodeId`, matching the original's
//! `~/.agent_config.json` / `GetGlobalId()` behavior (§6.6): read the file,
//! and if it is missing or lacks `global_id`, mint a fresh UUID and persist
//! it back so the id survives agent restarts.

use std::path::PathBuf;

use fleet_model::NodeId;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::AgentError;

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_default();
    PathBuf::from(home).join(".agent_config.json")
}

/// Load the persisted `NodeId`, generating and persisting a new one if the
/// config file is absent or incomplete.
pub async fn load_or_create() -> Result<NodeId, AgentError> {
    load_or_create_at(&config_path()).await
}

async fn load_or_create_at(path: &std::path::Path) -> Result<NodeId, AgentError> {
    let existing = match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str::<Value>(&contents).ok(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read agent config, regenerating");
            None
        }
    };

    if let Some(id) = existing
        .as_ref()
        .and_then(|v| v.get("global_id"))
        .and_then(|v| v.as_str())
        .and_then(|s| NodeId::parse(s).ok())
    {
        return Ok(id);
    }

    let id = NodeId::new_v4();
    let mut doc = existing.unwrap_or_else(|| json!({}));
    if let Value::Object(map) = &mut doc {
        map.insert("global_id".to_string(), json!(id.to_string()));
    } else {
        doc = json!({"global_id": id.to_string()});
    }

    let rendered =
        serde_json::to_string_pretty(&doc).map_err(|e| AgentError::MalformedConfig {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
    tokio::fs::write(path, rendered)
        .await
        .map_err(|source| AgentError::WriteFile {
            path: path.display().to_string(),
            source,
        })?;

    Ok(id)
}
