//! Redis resource descriptor and its configuration facets.

use std::time::Duration;

use rand::Rng;
use rand::distributions::Alphanumeric;
use secrecy::SecretString;

use crate::error::ConfigError;

/// Registry the server image is pulled from.
pub const IMAGE_REGISTRY: &str = "docker.io";
/// Server image name.
pub const IMAGE_NAME: &str = "redis";
/// Server image tag.
pub const IMAGE_TAG: &str = "latest";

/// Name of the resource's primary endpoint.
pub const PRIMARY_ENDPOINT_NAME: &str = "tcp";

/// Environment variable the launch command dereferences for the password.
pub const PASSWORD_ENV_VAR: &str = "REDIS_PASSWORD";

/// Port redis-server listens on inside the container by default.
pub const DEFAULT_TARGET_PORT: u16 = 6379;

/// Length of generated default passwords.
const GENERATED_PASSWORD_LEN: usize = 22;

/// Network endpoint declaration for the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Host-published port. `None` lets the runtime allocate one.
    pub port: Option<u16>,
    /// Port the server listens on inside the container.
    pub target_port: u16,
}

impl Endpoint {
    /// Protocol tag of the primary endpoint.
    pub fn protocol(&self) -> &'static str {
        PRIMARY_ENDPOINT_NAME
    }
}

/// Periodic snapshotting policy for the server.
///
/// Presence of the facet is itself meaningful: a resource without one emits
/// no `--save` flag at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPolicy {
    /// Time between snapshots. `None` falls back to
    /// [`SnapshotPolicy::DEFAULT_INTERVAL`] at assembly time.
    pub interval: Option<Duration>,
    /// Number of changed keys that triggers a snapshot within the interval.
    pub keys_changed_threshold: u64,
}

impl SnapshotPolicy {
    /// Interval applied when the facet is present but no interval was given.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(interval: Option<Duration>, keys_changed_threshold: u64) -> Self {
        Self {
            interval,
            keys_changed_threshold,
        }
    }
}

/// Declarative specification of one Redis instance in the application graph.
///
/// Built with the `with_*` methods and declared on an
/// [`AppBuilder`](crate::builder::AppBuilder). Immutable once declared; the
/// connection descriptor is bound later by the readiness coordinator.
#[derive(Debug, Clone)]
pub struct RedisResource {
    /// Unique name within the owning application graph.
    pub name: String,
    /// Published/target port pair for the primary endpoint.
    pub endpoint: Endpoint,
    /// Password for the server, if any.
    pub password: Option<SecretString>,
    /// Path to a server config file inside the container.
    pub config_file: Option<String>,
    /// Periodic snapshotting policy.
    pub snapshot: Option<SnapshotPolicy>,
}

impl RedisResource {
    /// Declare a resource named `name`.
    ///
    /// The name is the resource's identity in the graph and must be
    /// non-empty; everything else is optional.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }

        Ok(Self {
            name,
            endpoint: Endpoint {
                port: None,
                target_port: DEFAULT_TARGET_PORT,
            },
            password: None,
            config_file: None,
            snapshot: None,
        })
    }

    /// Publish the endpoint on a fixed host port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.endpoint.port = Some(port);
        self
    }

    /// Change the port the server listens on inside the container.
    pub fn with_target_port(mut self, target_port: u16) -> Self {
        self.endpoint.target_port = target_port;
        self
    }

    /// Point the server at a config file inside the container.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Require the given password.
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Require a password generated at declaration time.
    pub fn with_generated_password(mut self) -> Self {
        self.password = Some(generate_password());
        self
    }

    /// Enable periodic snapshotting.
    pub fn with_snapshot(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot = Some(policy);
        self
    }

    /// Full image reference for the server container.
    pub fn image(&self) -> String {
        format!("{IMAGE_REGISTRY}/{IMAGE_NAME}:{IMAGE_TAG}")
    }

    /// Key this resource's probe is registered under in the health registry.
    pub fn health_check_key(&self) -> String {
        format!("{}_check", self.name)
    }
}

/// Generate a default password.
///
/// Alphanumeric only: some client libraries cannot parse special characters
/// (commas in particular) out of connection strings.
fn generate_password() -> SecretString {
    let raw: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect();
    SecretString::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            RedisResource::new(""),
            Err(ConfigError::MissingName)
        ));
        assert!(matches!(
            RedisResource::new("   "),
            Err(ConfigError::MissingName)
        ));
    }

    #[test]
    fn test_declaration_defaults() {
        let resource = RedisResource::new("db").unwrap();

        assert_eq!(resource.endpoint.port, None);
        assert_eq!(resource.endpoint.target_port, DEFAULT_TARGET_PORT);
        assert_eq!(resource.endpoint.protocol(), "tcp");
        assert!(resource.password.is_none());
        assert!(resource.config_file.is_none());
        assert!(resource.snapshot.is_none());
    }

    #[test]
    fn test_image_reference() {
        let resource = RedisResource::new("db").unwrap();
        assert_eq!(resource.image(), "docker.io/redis:latest");
    }

    #[test]
    fn test_health_check_key() {
        let resource = RedisResource::new("db").unwrap();
        assert_eq!(resource.health_check_key(), "db_check");
    }

    #[test]
    fn test_generated_password_shape() {
        let resource = RedisResource::new("db").unwrap().with_generated_password();

        let password = resource.password.unwrap();
        let raw = password.expose_secret();
        assert_eq!(raw.len(), GENERATED_PASSWORD_LEN);
        assert!(raw.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_passwords_differ() {
        let a = RedisResource::new("a").unwrap().with_generated_password();
        let b = RedisResource::new("b").unwrap().with_generated_password();

        assert_ne!(
            a.password.unwrap().expose_secret(),
            b.password.unwrap().expose_secret()
        );
    }
}
