use async_trait::async_trait;
use fleet_model::ContainerSpec;
use serde_json::{Value, json};

use crate::engine::{ContainerEngine, ContainerState};
use crate::error::ContainerError;

/// A `reqwest`-backed `ContainerEngine` talking to a Docker-Engine-
/// compatible REST API over a plain TCP host:port, the remote-accessible
/// configuration this fleet's nodes run with.
///
/// Request/response shapes mirror the original `DockerClient`: container
/// creation posts `Cmd`/`Env`/`Image`/`Args`/`Tty`/`ExposedPorts` at the
/// top level and `Binds`/`PortBindings`/`Devices`/`Privileged` under
/// `HostConfig`; start/stop are empty-bodied POSTs; remove is a DELETE
/// with `v`/`force`/`link` query parameters.
pub struct DockerEngineClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl DockerEngineClient {
    pub fn new(base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_version: api_version.into(),
        }
    }

    fn api_path(&self, cmd: &str) -> String {
        format!("{}/{}{}", self.base_url, self.api_version, cmd)
    }

    fn create_body(spec: &ContainerSpec) -> Value {
        let exposed_port_key = format!("{}/tcp", spec.container_port);
        let devices: Vec<Value> = spec
            .devices
            .iter()
            .map(|path| {
                json!({
                    "PathOnHost": path,
                    "PathInContainer": path,
                    "CgroupPermissions": "rwm",
                })
            })
            .collect();

        json!({
            "Cmd": spec.cmds,
            "Env": spec.env,
            "Image": spec.image,
            "Args": spec.args,
            "Tty": spec.tty.get(),
            "AttachStdout": true,
            "AttachStderr": true,
            "ExposedPorts": { exposed_port_key: {} },
            "HostConfig": {
                "Binds": spec.binds,
                "PortBindings": {
                    format!("{}/tcp", spec.container_port): [
                        { "HostIp": "0.0.0.0", "HostPort": spec.host_port.to_string() }
                    ]
                },
                "Devices": devices,
                "Privileged": spec.privileged.get(),
            },
        })
    }
}

#[async_trait]
impl ContainerEngine for DockerEngineClient {
    async fn create(&self, spec: &ContainerSpec) -> Result<String, ContainerError> {
        let url = self.api_path("/containers/create");
        let response = self
            .http
            .post(&url)
            .query(&[("name", spec.container_name.as_str())])
            .json(&Self::create_body(spec))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() != 201 {
            return Err(ContainerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|_| ContainerError::Rejected {
            status: status.as_u16(),
            body: body.clone(),
        })?;

        let id = parsed
            .get("Id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if id.is_empty() {
            return Err(ContainerError::EmptyId {
                container_name: spec.container_name.clone(),
            });
        }
        Ok(id)
    }

    async fn start(&self, container_id: &str) -> Result<(), ContainerError> {
        let url = self.api_path(&format!("/containers/{container_id}/start"));
        let response = self.http.post(&url).send().await?;
        match response.status().as_u16() {
            204 | 304 => Ok(()),
            404 => Err(ContainerError::NotFound(container_id.to_string())),
            status => Err(ContainerError::Rejected {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn remove(&self, container_id: &str) -> Result<(), ContainerError> {
        let url = self.api_path(&format!("/containers/{container_id}"));
        let response = self
            .http
            .delete(&url)
            .query(&[("v", "false"), ("force", "true"), ("link", "false")])
            .send()
            .await?;
        match response.status().as_u16() {
            204 => Ok(()),
            404 => Err(ContainerError::NotFound(container_id.to_string())),
            status => Err(ContainerError::Rejected {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn inspect_state(&self, container_id: &str) -> Result<ContainerState, ContainerError> {
        let url = self.api_path(&format!("/containers/{container_id}/json"));
        let response = self.http.get(&url).send().await?;
        if response.status().as_u16() == 404 {
            return Err(ContainerError::NotFound(container_id.to_string()));
        }
        let body: Value = response.json().await?;
        let status = body
            .get("State")
            .and_then(|s| s.get("Status"))
            .and_then(Value::as_str)
            .unwrap_or("");

        Ok(match status {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            _ => ContainerState::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use fleet_model::Flag;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn spec() -> ContainerSpec {
        ContainerSpec {
            container_name: "yolov5-rk3588".to_string(),
            image: "fleet/yolov5:rk3588".to_string(),
            cmds: vec![],
            args: vec![],
            privileged: Flag::disabled(),
            env: vec![],
            binds: vec![],
            devices: vec!["/dev/dri".to_string()],
            host_port: 18080,
            container_port: 8080,
            tty: Flag::disabled(),
            network_config: None,
        }
    }

    #[tokio::test]
    async fn create_returns_id_on_201() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.44/containers/create"))
            .and(query_param("name", "yolov5-rk3588"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": "abc123"})))
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        let id = client.create(&spec()).await.unwrap();
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn create_empty_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.44/containers/create"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": ""})))
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        let err = client.create(&spec()).await.unwrap_err();
        assert!(matches!(err, ContainerError::EmptyId { .. }));
    }

    #[tokio::test]
    async fn start_accepts_204_and_304() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.44/containers/abc123/start"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        client.start("abc123").await.unwrap();
    }

    #[tokio::test]
    async fn remove_sends_expected_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1.44/containers/abc123"))
            .and(query_param("v", "false"))
            .and(query_param("force", "true"))
            .and(query_param("link", "false"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        client.remove("abc123").await.unwrap();
    }

    #[tokio::test]
    async fn remove_not_found_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1.44/containers/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        let err = client.remove("missing").await.unwrap_err();
        assert!(matches!(err, ContainerError::NotFound(_)));
    }

    #[tokio::test]
    async fn inspect_state_maps_docker_status_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.44/containers/abc123/json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"State": {"Status": "running"}})),
            )
            .mount(&server)
            .await;

        let client = DockerEngineClient::new(server.uri(), "v1.44");
        let state = client.inspect_state("abc123").await.unwrap();
        assert_eq!(state, ContainerState::Running);
    }
}
