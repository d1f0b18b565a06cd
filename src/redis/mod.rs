//! Redis resource provisioning.
//!
//! Declares a containerized Redis instance as a resource in the application
//! graph: the command assembler maps the declared facets (config file,
//! password, snapshot policy) onto a launch command at declaration time, and
//! the readiness coordinator binds the connection descriptor later, once the
//! runtime reports the instance reachable.
//!
//! # Example
//!
//! ```rust,no_run
//! use berth::AppBuilder;
//! use berth::events::ReachableEvent;
//! use berth::redis::RedisResource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut builder = AppBuilder::new();
//! let db = builder.add_redis(
//!     RedisResource::new("db")?
//!         .with_port(6379)
//!         .with_config_file("/etc/redis/redis-full.conf"),
//! )?;
//!
//! // The runtime driver submits db.launch, then reports the instance
//! // reachable once it is up.
//! builder.eventing().publish_reachable(
//!     "db",
//!     ReachableEvent {
//!         host: "127.0.0.1".to_string(),
//!         port: 6379,
//!     },
//! );
//!
//! let connection = db.readiness.wait_connection().await?;
//! println!("redis available at {connection}");
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod connection;
pub mod readiness;
pub mod resource;

pub use command::{LaunchCommand, SHELL_ENTRYPOINT, assemble};
pub use connection::ConnectionDescriptor;
pub use readiness::{ConnectionWatch, ReadinessCoordinator, ReadinessState};
pub use resource::{Endpoint, RedisResource, SnapshotPolicy};
