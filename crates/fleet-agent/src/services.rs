//! Config loading for the services the agent supervises (§6.6,
//! `agent_services.json` / `slave_backend.json`), matching the original's
//! `LoadAgentServicesConfig`/`LoadSlaveBackendConfig`/`GetServiceEntry`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentServicesConfig {
    #[serde(default)]
    pub autostart_services: Vec<String>,
    #[serde(default)]
    pub python_bin: Option<String>,
    #[serde(default)]
    pub restart_delay_sec: Option<u64>,
    #[serde(default)]
    pub recv_server_cmd: Option<String>,
    #[serde(default)]
    pub rst_send_cmd: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceEntry {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub start_cmd: Option<String>,
    #[serde(default)]
    pub input_dir: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub agent_autostart: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlaveBackendConfig {
    #[serde(default)]
    pub services: HashMap<String, ServiceEntry>,
}

impl SlaveBackendConfig {
    pub fn autostart_from_backend(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .services
            .iter()
            .filter(|(_, entry)| entry.agent_autostart)
            .map(|(name, _)| name.clone())
            .collect();
        out.sort();
        out
    }
}

/// Loads a JSON config at `path`, returning the default (empty) value if
/// the file does not exist or fails to parse — matching the original's
/// "best effort, never fatal" config loading.
pub async fn load_json_or_default<T>(path: &Path) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse config, using default");
            T::default()
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read config, using default");
            T::default()
        }
    }
}

/// Union of two name lists, preserving `a`'s order and appending any new
/// names from `b`.
pub fn unique_union(a: Vec<String>, b: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashSet<&str> = a.iter().map(|s| s.as_str()).collect();
    let mut out = a;
    for name in b {
        if seen.insert(name.as_str()) {
            out.push(name.clone());
        }
    }
    out
}

/// Replaces `${INPUT_DIR}`/`${OUTPUT_DIR}`/`${SERVICE_NAME}` placeholders
/// in a `start_cmd` template (§4.11).
pub fn render_placeholders(template: &str, input_dir: &str, output_dir: &str, service: &str) -> String {
    template
        .replace("${INPUT_DIR}", input_dir)
        .replace("${OUTPUT_DIR}", output_dir)
        .replace("${SERVICE_NAME}", service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_preserves_order_and_dedupes() {
        let a = vec!["foo".to_string(), "bar".to_string()];
        let b = vec!["bar".to_string(), "baz".to_string()];
        assert_eq!(unique_union(a, &b), vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn renders_all_placeholders() {
        let out = render_placeholders(
            "run ${SERVICE_NAME} --in ${INPUT_DIR} --out ${OUTPUT_DIR}",
            "/data/in",
            "/data/out",
            "yolo",
        );
        assert_eq!(out, "run yolo --in /data/in --out /data/out");
    }

    #[test]
    fn autostart_from_backend_filters_and_sorts() {
        let mut services = HashMap::new();
        services.insert(
            "b".to_string(),
            ServiceEntry {
                agent_autostart: true,
                ..Default::default()
            },
        );
        services.insert(
            "a".to_string(),
            ServiceEntry {
                agent_autostart: true,
                ..Default::default()
            },
        );
        services.insert("c".to_string(), ServiceEntry::default());
        let cfg = SlaveBackendConfig { services };
        assert_eq!(cfg.autostart_from_backend(), vec!["a", "b"]);
    }
}
