//! Application graph builder: the declaration surface for resources.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::events::Eventing;
use crate::health::HealthRegistry;
use crate::launch::LaunchSpec;
use crate::redis::command::{SHELL_ENTRYPOINT, assemble};
use crate::redis::readiness::ReadinessCoordinator;
use crate::redis::resource::RedisResource;

/// Builder for a composed application graph.
///
/// Owns the eventing bus and the health registry; every resource declaration
/// wires both. Resource names are unique across the graph.
pub struct AppBuilder {
    config: AppConfig,
    eventing: Eventing,
    health: HealthRegistry,
    names: HashSet<String>,
}

/// Handle to one declared Redis resource.
#[derive(Debug)]
pub struct RedisHandle {
    /// The descriptor the resource was declared with.
    pub resource: RedisResource,
    /// Launch artifact rendered at declaration time.
    pub launch: LaunchSpec,
    /// Readiness coordinator for the instance.
    pub readiness: Arc<ReadinessCoordinator>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            eventing: Eventing::new(),
            health: HealthRegistry::new(),
            names: HashSet::new(),
        }
    }

    /// Declare a Redis resource on the graph.
    ///
    /// Assembles the launch command inline, then registers the readiness
    /// coordinator and its health probe. Must be called within a Tokio
    /// runtime. Declaring a second resource under the same name is a
    /// configuration error.
    pub fn add_redis(&mut self, resource: RedisResource) -> Result<RedisHandle, ConfigError> {
        if !self.names.insert(resource.name.clone()) {
            return Err(ConfigError::DuplicateResource {
                name: resource.name.clone(),
            });
        }

        let command = assemble(&resource);
        let launch = LaunchSpec {
            image: self
                .config
                .image_override
                .clone()
                .unwrap_or_else(|| resource.image()),
            entrypoint: vec![SHELL_ENTRYPOINT.to_string()],
            args: command.shell_args,
            env: command.env,
            bind_host: self.config.bind_host.clone(),
            port: resource.endpoint.port,
            target_port: resource.endpoint.target_port,
        };

        let readiness = ReadinessCoordinator::spawn(
            &resource,
            &self.eventing,
            &self.health,
            self.config.probe_timeout(),
        )?;

        tracing::info!("declared redis resource '{}'", resource.name);

        Ok(RedisHandle {
            resource,
            launch,
            readiness,
        })
    }

    /// The eventing bus; its publishing side belongs to the runtime driver.
    pub fn eventing(&self) -> Eventing {
        self.eventing.clone()
    }

    /// The graph's health registry.
    pub fn health(&self) -> HealthRegistry {
        self.health.clone()
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let mut builder = AppBuilder::new();
        builder.add_redis(RedisResource::new("db").unwrap()).unwrap();

        let err = builder
            .add_redis(RedisResource::new("db").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateResource { name } if name == "db"
        ));
    }

    #[tokio::test]
    async fn test_launch_spec_wiring() {
        let mut builder = AppBuilder::new();
        let handle = builder
            .add_redis(
                RedisResource::new("db")
                    .unwrap()
                    .with_port(6379)
                    .with_config_file("/etc/redis/redis-full.conf"),
            )
            .unwrap();

        assert_eq!(handle.launch.image, "docker.io/redis:latest");
        assert_eq!(handle.launch.entrypoint, vec!["/bin/sh".to_string()]);
        assert_eq!(
            handle.launch.args,
            vec![
                "-c".to_string(),
                "redis-server /etc/redis/redis-full.conf".to_string(),
            ]
        );
        assert_eq!(handle.launch.port, Some(6379));
        assert_eq!(handle.launch.target_port, 6379);
        assert_eq!(handle.launch.bind_host, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_image_override_applies() {
        let config = AppConfig {
            image_override: Some("docker.io/redis:7.4".to_string()),
            ..Default::default()
        };
        let mut builder = AppBuilder::with_config(config);

        let handle = builder.add_redis(RedisResource::new("db").unwrap()).unwrap();
        assert_eq!(handle.launch.image, "docker.io/redis:7.4");
    }

    #[tokio::test]
    async fn test_distinct_resources_register_probes() {
        let mut builder = AppBuilder::new();
        builder.add_redis(RedisResource::new("db").unwrap()).unwrap();
        builder
            .add_redis(RedisResource::new("cache").unwrap())
            .unwrap();

        assert_eq!(builder.health().keys(), vec!["cache_check", "db_check"]);
    }
}
