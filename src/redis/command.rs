//! Deterministic assembly of the server launch command.

use secrecy::ExposeSecret;

use super::resource::{PASSWORD_ENV_VAR, RedisResource, SnapshotPolicy};

/// Executable invoked inside the container.
const SERVER_BIN: &str = "redis-server";

/// Entrypoint the assembled args are handed to.
///
/// The shell indirection makes `$REDIS_PASSWORD` expand at process start
/// instead of at declaration time, so the secret never crosses the host as
/// part of an argument list.
pub const SHELL_ENTRYPOINT: &str = "/bin/sh";

/// Assembled launch command: the outer shell arguments plus the environment
/// the command string dereferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Arguments for the [`SHELL_ENTRYPOINT`]: `["-c", "<server command>"]`.
    pub shell_args: Vec<String>,
    /// Environment variables required by the command string.
    pub env: Vec<(String, String)>,
}

/// Map the resource facets onto the server command line.
///
/// The output depends only on the resource: assembling twice from the same
/// input yields identical tokens and env. Token order is fixed and consumers
/// of the launched process rely on it: config file first, then
/// `--requirepass`, then `--save`.
pub fn assemble(resource: &RedisResource) -> LaunchCommand {
    let tokens = server_tokens(resource);

    let mut env = Vec::new();
    if let Some(password) = &resource.password {
        env.push((
            PASSWORD_ENV_VAR.to_string(),
            password.expose_secret().to_string(),
        ));
    }

    LaunchCommand {
        shell_args: vec!["-c".to_string(), tokens.join(" ")],
        env,
    }
}

/// Ordered tokens of the inner server command.
fn server_tokens(resource: &RedisResource) -> Vec<String> {
    let mut tokens = vec![SERVER_BIN.to_string()];

    if let Some(path) = resource.config_file.as_deref().filter(|p| !p.is_empty()) {
        tokens.push(path.to_string());
    }

    if resource.password.is_some() {
        tokens.push("--requirepass".to_string());
        // Placeholder only; the value rides in the env map.
        tokens.push(format!("${PASSWORD_ENV_VAR}"));
    }

    if let Some(policy) = &resource.snapshot {
        let interval = policy.interval.unwrap_or(SnapshotPolicy::DEFAULT_INTERVAL);
        tokens.push("--save".to_string());
        tokens.push(interval.as_secs().to_string());
        tokens.push(policy.keys_changed_threshold.to_string());
    }

    tokens
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_bare_resource_is_base_token_only() {
        let resource = RedisResource::new("db").unwrap();
        let command = assemble(&resource);

        assert_eq!(
            command.shell_args,
            vec!["-c".to_string(), "redis-server".to_string()]
        );
        assert!(command.env.is_empty());
    }

    #[test]
    fn test_config_file_follows_base_token() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_port(6379)
            .with_config_file("/etc/redis/redis-full.conf");

        assert_eq!(
            server_tokens(&resource),
            vec![
                "redis-server".to_string(),
                "/etc/redis/redis-full.conf".to_string(),
            ]
        );
        assert_eq!(
            assemble(&resource).shell_args,
            vec![
                "-c".to_string(),
                "redis-server /etc/redis/redis-full.conf".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_config_path_emits_no_token() {
        let resource = RedisResource::new("db").unwrap().with_config_file("");

        assert_eq!(server_tokens(&resource), vec!["redis-server".to_string()]);
    }

    #[test]
    fn test_password_stays_out_of_the_args() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_password(SecretString::from("hunter2".to_string()));
        let command = assemble(&resource);

        assert!(!command.shell_args.iter().any(|t| t.contains("hunter2")));
        assert!(command.shell_args[1].contains("--requirepass $REDIS_PASSWORD"));
        assert_eq!(
            command.env,
            vec![("REDIS_PASSWORD".to_string(), "hunter2".to_string())]
        );
    }

    #[test]
    fn test_snapshot_tokens_in_order() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_snapshot(SnapshotPolicy::new(Some(Duration::from_secs(60)), 1000));

        assert_eq!(
            server_tokens(&resource),
            vec![
                "redis-server".to_string(),
                "--save".to_string(),
                "60".to_string(),
                "1000".to_string(),
            ]
        );
    }

    #[test]
    fn test_snapshot_interval_defaults_to_sixty_seconds() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_snapshot(SnapshotPolicy::new(None, 5));

        let tokens = server_tokens(&resource);
        assert_eq!(tokens[2], "60");
        assert_eq!(tokens[3], "5");
    }

    #[test]
    fn test_full_facet_command_string() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_password(SecretString::from("s3cret".to_string()))
            .with_snapshot(SnapshotPolicy::new(Some(Duration::from_secs(30)), 5));
        let command = assemble(&resource);

        assert_eq!(
            command.shell_args[1],
            "redis-server --requirepass $REDIS_PASSWORD --save 30 5"
        );
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let resource = RedisResource::new("db")
            .unwrap()
            .with_config_file("/etc/redis/redis.conf")
            .with_password(SecretString::from("s3cret".to_string()))
            .with_snapshot(SnapshotPolicy::new(Some(Duration::from_secs(30)), 5));

        assert_eq!(assemble(&resource), assemble(&resource));
    }
}
