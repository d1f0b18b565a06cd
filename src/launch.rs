//! Launch artifact handed to the container runtime.

use std::collections::HashMap;

use bollard::container::Config;
use bollard::models::{HostConfig, PortBinding};
use serde::{Deserialize, Serialize};

/// Fully rendered launch specification for one container.
///
/// This is the boundary with the container runtime: the host renders the
/// spec at declaration time, the runtime submits it. The env map carries the
/// resolved secret values; the args never do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Image reference including registry and tag.
    pub image: String,
    /// Container entrypoint.
    pub entrypoint: Vec<String>,
    /// Arguments passed to the entrypoint.
    pub args: Vec<String>,
    /// Environment variables set for the process.
    pub env: Vec<(String, String)>,
    /// Host address the published port binds to.
    pub bind_host: String,
    /// Published host port, if fixed at declaration time. `None` lets the
    /// runtime allocate one.
    pub port: Option<u16>,
    /// Port exposed inside the container.
    pub target_port: u16,
}

impl LaunchSpec {
    /// Render the spec as a container config the runtime can submit.
    pub fn to_container_config(&self) -> Config<String> {
        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            format!("{}/tcp", self.target_port),
            Some(vec![PortBinding {
                host_ip: Some(self.bind_host.clone()),
                host_port: self.port.map(|p| p.to_string()),
            }]),
        );

        let exposed_ports: HashMap<String, HashMap<(), ()>> =
            HashMap::from([(format!("{}/tcp", self.target_port), HashMap::new())]);

        let env: Vec<String> = self.env.iter().map(|(k, v)| format!("{k}={v}")).collect();

        Config {
            image: Some(self.image.clone()),
            entrypoint: Some(self.entrypoint.clone()),
            cmd: Some(self.args.clone()),
            env: if env.is_empty() { None } else { Some(env) },
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> LaunchSpec {
        LaunchSpec {
            image: "docker.io/redis:latest".to_string(),
            entrypoint: vec!["/bin/sh".to_string()],
            args: vec!["-c".to_string(), "redis-server".to_string()],
            env: vec![("REDIS_PASSWORD".to_string(), "hunter2".to_string())],
            bind_host: "127.0.0.1".to_string(),
            port: Some(6379),
            target_port: 6379,
        }
    }

    #[test]
    fn test_container_config_rendering() {
        let config = spec().to_container_config();

        assert_eq!(config.image.as_deref(), Some("docker.io/redis:latest"));
        assert_eq!(config.entrypoint, Some(vec!["/bin/sh".to_string()]));
        assert_eq!(
            config.cmd,
            Some(vec!["-c".to_string(), "redis-server".to_string()])
        );
        assert_eq!(config.env, Some(vec!["REDIS_PASSWORD=hunter2".to_string()]));

        let host_config = config.host_config.unwrap();
        let bindings = host_config.port_bindings.unwrap();
        let binding = bindings["6379/tcp"].as_ref().unwrap();
        assert_eq!(binding[0].host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(binding[0].host_port.as_deref(), Some("6379"));
    }

    #[test]
    fn test_empty_env_is_omitted() {
        let mut launch = spec();
        launch.env.clear();

        assert!(launch.to_container_config().env.is_none());
    }

    #[test]
    fn test_unallocated_port_has_no_host_binding() {
        let mut launch = spec();
        launch.port = None;

        let config = launch.to_container_config();
        let bindings = config.host_config.unwrap().port_bindings.unwrap();
        let binding = bindings["6379/tcp"].as_ref().unwrap();
        assert!(binding[0].host_port.is_none());
    }
}
