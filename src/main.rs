//! berth - declare a resource, emit its launch plan, drive readiness.

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use berth::{
    AppBuilder,
    config::AppConfig,
    events::ReachableEvent,
    redis::{RedisResource, SnapshotPolicy},
};

#[derive(Parser)]
#[command(name = "berth", about = "Declarative provisioning for containerized services")]
struct Cli {
    /// Resource name, unique within the graph.
    #[arg(long, default_value = "db")]
    name: String,

    /// Host port to publish the endpoint on.
    #[arg(long)]
    port: Option<u16>,

    /// Port the server listens on inside the container.
    #[arg(long, default_value_t = 6379)]
    target_port: u16,

    /// Path to a server config file inside the container.
    #[arg(long)]
    config_file: Option<String>,

    /// Password for the server. Omit for an unauthenticated instance.
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Generate a default password instead of passing one.
    #[arg(long, conflicts_with = "password")]
    generate_password: bool,

    /// Snapshot after this many key changes.
    #[arg(long)]
    save_keys_changed: Option<u64>,

    /// Snapshot interval in seconds. Defaults to 60 when only
    /// --save-keys-changed is given.
    #[arg(long, requires = "save_keys_changed")]
    save_interval_secs: Option<u64>,

    /// Report the instance at HOST:PORT as reachable and run its health
    /// probe once.
    #[arg(long, value_name = "HOST:PORT")]
    reachable: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::resolve()?;
    let mut builder = AppBuilder::with_config(config);

    let mut resource = RedisResource::new(&cli.name)?.with_target_port(cli.target_port);
    if let Some(port) = cli.port {
        resource = resource.with_port(port);
    }
    if let Some(path) = &cli.config_file {
        resource = resource.with_config_file(path);
    }
    if let Some(password) = cli.password {
        resource = resource.with_password(SecretString::from(password));
    } else if cli.generate_password {
        resource = resource.with_generated_password();
    }
    if let Some(threshold) = cli.save_keys_changed {
        let interval = cli
            .save_interval_secs
            .map(std::time::Duration::from_secs);
        resource = resource.with_snapshot(SnapshotPolicy::new(interval, threshold));
    }

    let handle = builder.add_redis(resource)?;

    println!("{}", serde_json::to_string_pretty(&handle.launch)?);

    if let Some(addr) = cli.reachable {
        let (host, port) = parse_addr(&addr)?;
        builder
            .eventing()
            .publish_reachable(&cli.name, ReachableEvent { host, port });

        let descriptor = handle.readiness.wait_connection().await?;
        tracing::info!("resource '{}' resolved at {}", cli.name, descriptor);

        let key = handle.resource.health_check_key();
        if let Some(status) = builder.health().check(&key).await {
            tracing::info!("health check '{}': {:?}", key, status);
        }
    }

    Ok(())
}

fn parse_addr(addr: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .with_context(|| format!("expected HOST:PORT, got '{addr}'"))?;
    let port = port
        .parse()
        .with_context(|| format!("invalid port in '{addr}'"))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        assert_eq!(
            parse_addr("127.0.0.1:6379").unwrap(),
            ("127.0.0.1".to_string(), 6379)
        );
        assert!(parse_addr("no-port").is_err());
        assert!(parse_addr("host:notanumber").is_err());
    }
}
